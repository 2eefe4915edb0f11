pub mod api_client;
pub mod auth_client;
pub mod consultation_client;
pub mod consultation_service;
pub mod stock_client;

pub use api_client::ApiClient;
pub use auth_client::AuthClient;
pub use consultation_client::ConsultationClient;
pub use consultation_service::ConsultationService;
pub use stock_client::StockClient;
