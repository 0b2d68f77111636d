use fetchgo_engine::{
    db_types::{
        AccountKind,
        ChatMessage,
        Customer,
        NewCustomer,
        NewMessage,
        NewRider,
        Order,
        OrderId,
        Rider,
        Role,
    },
    order_objects::OrderQueryFilter,
    traits::{AccountApiError, AccountManagement, AuthApiError, AuthManagement, ChatApiError, ChatManagement},
};
use mockall::mock;

mock! {
    pub AccountManager {}
    impl AccountManagement for AccountManager {
        async fn fetch_customer(&self, customer_id: i64) -> Result<Option<Customer>, AccountApiError>;
        async fn fetch_rider(&self, rider_id: i64) -> Result<Option<Rider>, AccountApiError>;
        async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, AccountApiError>;
        async fn fetch_orders_for_customer(&self, customer_id: i64) -> Result<Vec<Order>, AccountApiError>;
        async fn fetch_orders_for_rider(&self, rider_id: i64) -> Result<Vec<Order>, AccountApiError>;
        async fn fetch_available_orders(&self) -> Result<Vec<Order>, AccountApiError>;
        async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, AccountApiError>;
    }
}

mock! {
    pub AuthManager {}
    impl AuthManagement for AuthManager {
        async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, AuthApiError>;
        async fn insert_rider(&self, rider: NewRider) -> Result<Rider, AuthApiError>;
        async fn fetch_customer_credentials(&self, phone_number: &str) -> Result<Option<(Customer, String)>, AuthApiError>;
        async fn fetch_rider_credentials(&self, phone_number: &str) -> Result<Option<(Rider, String)>, AuthApiError>;
        async fn fetch_extra_roles(&self, kind: AccountKind, account_id: i64) -> Result<Vec<Role>, AuthApiError>;
        async fn assign_roles(&self, kind: AccountKind, account_id: i64, roles: &[Role]) -> Result<(), AuthApiError>;
        async fn remove_roles(&self, kind: AccountKind, account_id: i64, roles: &[Role]) -> Result<u64, AuthApiError>;
    }
}

// The chat API needs both the chat store and the order lookups behind one backend.
mock! {
    pub ChatBackend {}
    impl ChatManagement for ChatBackend {
        async fn insert_message(&self, message: NewMessage) -> Result<ChatMessage, ChatApiError>;
        async fn fetch_messages_for_order(&self, order_id: &OrderId) -> Result<Vec<ChatMessage>, ChatApiError>;
    }
    impl AccountManagement for ChatBackend {
        async fn fetch_customer(&self, customer_id: i64) -> Result<Option<Customer>, AccountApiError>;
        async fn fetch_rider(&self, rider_id: i64) -> Result<Option<Rider>, AccountApiError>;
        async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, AccountApiError>;
        async fn fetch_orders_for_customer(&self, customer_id: i64) -> Result<Vec<Order>, AccountApiError>;
        async fn fetch_orders_for_rider(&self, rider_id: i64) -> Result<Vec<Order>, AccountApiError>;
        async fn fetch_available_orders(&self) -> Result<Vec<Order>, AccountApiError>;
        async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, AccountApiError>;
    }
}
