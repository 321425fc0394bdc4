pub mod commands;
pub mod directory;
pub mod errors;
pub mod fees;
pub mod reservation;
pub mod value_objects;

pub use directory::*;
pub use errors::*;
pub use reservation::{
    ActiveReservation, BookSnapshot, NewReservation, Reservation, ReservationCore,
    ReservationStatus, ReservationTerms, ReturnedReservation,
};
pub use value_objects::*;
