pub mod catalog;
pub mod handlers;
pub mod middleware;
pub mod page;
pub mod routes;
pub mod sync;

pub use routes::create_router;
