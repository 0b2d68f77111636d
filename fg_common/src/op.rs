//! Arithmetic boilerplate for transparent i64 newtypes.

#[macro_export]
macro_rules! op {
    (binary $t:ty, $trait:ident, $method:ident) => {
        impl $trait for $t {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self::Output {
                Self::from($trait::$method(self.value(), rhs.value()))
            }
        }
    };
    (inplace $t:ty, $trait:ident, $method:ident) => {
        impl $trait for $t {
            fn $method(&mut self, rhs: Self) {
                let mut value = self.value();
                $trait::$method(&mut value, rhs.value());
                *self = Self::from(value);
            }
        }
    };
    (unary $t:ty, $trait:ident, $method:ident) => {
        impl $trait for $t {
            type Output = Self;

            fn $method(self) -> Self::Output {
                Self::from($trait::$method(self.value()))
            }
        }
    };
}
