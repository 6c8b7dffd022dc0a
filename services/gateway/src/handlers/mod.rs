pub mod health;
pub mod offers;
pub mod providers;
pub mod requests;
pub mod ws;
