use crate::domain::{
    ActiveReservation, NewReservation, Reservation, ReservationCore, ReservationId,
    ReservationStatus, ReturnedReservation, UserId,
};
use crate::ports::reservation_store::{ReservationStore as ReservationStoreTrait, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::BTreeMap;
use std::sync::Mutex;

struct State {
    next_id: i64,
    reservations: BTreeMap<ReservationId, Reservation>,
}

/// ReservationStoreのインメモリ実装
///
/// IDは1から順に採番し、一覧はID順で返す。
/// 更新はすべて単一のロック下で行うため、`mark_returned`はアトミックな check-and-set になる。
pub struct ReservationStore {
    state: Mutex<State>,
}

impl ReservationStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 1,
                reservations: BTreeMap::new(),
            }),
        }
    }

    fn filter<F>(&self, predicate: F) -> Vec<Reservation>
    where
        F: Fn(&Reservation) -> bool,
    {
        let state = self.state.lock().unwrap();
        state
            .reservations
            .values()
            .filter(|r| predicate(r))
            .cloned()
            .collect()
    }
}

impl Default for ReservationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReservationStoreTrait for ReservationStore {
    async fn insert(&self, reservation: NewReservation) -> Result<ActiveReservation> {
        let mut state = self.state.lock().unwrap();
        let reservation_id = ReservationId::new(state.next_id);
        state.next_id += 1;

        let active = ActiveReservation {
            core: ReservationCore {
                reservation_id,
                terms: reservation.terms,
                total_fee: reservation.total_fee,
                created_at: Utc::now(),
            },
        };
        state
            .reservations
            .insert(reservation_id, Reservation::Active(active.clone()));

        Ok(active)
    }

    async fn mark_returned(&self, reservation: &ReturnedReservation) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let Some(stored) = state.reservations.get_mut(&reservation.reservation_id) else {
            return Ok(false);
        };
        if !matches!(stored, Reservation::Active(_)) {
            return Ok(false);
        }

        *stored = Reservation::Returned(reservation.clone());
        Ok(true)
    }

    async fn find_by_id(&self, reservation_id: ReservationId) -> Result<Option<Reservation>> {
        let state = self.state.lock().unwrap();
        Ok(state.reservations.get(&reservation_id).cloned())
    }

    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Reservation>> {
        Ok(self.filter(|r| r.core().user_id == user_id))
    }

    async fn find_by_status(&self, status: ReservationStatus) -> Result<Vec<Reservation>> {
        Ok(self.filter(|r| r.status() == status))
    }

    async fn find_by_status_and_expected_return_date_before(
        &self,
        status: ReservationStatus,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>> {
        Ok(self.filter(|r| r.status() == status && r.core().expected_return_date < date))
    }

    async fn find_all(&self) -> Result<Vec<Reservation>> {
        Ok(self.filter(|_| true))
    }
}
