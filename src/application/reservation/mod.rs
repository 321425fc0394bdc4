mod errors;
mod queries;
mod reservation_service;
mod view;

pub use errors::{ErrorKind, ReservationError, Result};
pub use queries::{
    get_reservation, list_active_reservations, list_overdue_reservations, list_reservations,
    list_reservations_by_status, list_reservations_by_user,
};
pub use reservation_service::{ServiceDependencies, create_reservation, return_book};
pub use view::ReservationView;
