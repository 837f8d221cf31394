pub mod buses;
pub mod facilities;
pub mod orders;
pub mod trips;
pub mod users;
