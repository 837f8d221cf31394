pub mod bus;
pub mod bus_facility;
pub mod facility;
pub mod order;
pub mod ticket;
pub mod trip;
pub mod user;
