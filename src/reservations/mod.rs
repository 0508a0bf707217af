//! Reservations admin client, including driver assignment

mod types;

pub use types::*;

use serde_json::Value;

use crate::cache::{MutationEndpoint, Query, QueryCache, QueryEndpoint};
use crate::error::{Error, Result};
use crate::fetch::{path_id, BaseQuery};

/// Client for `/api/admin/reservations` and the driver lookups used when
/// assigning one
#[derive(Debug, Clone)]
pub struct ReservationsClient {
    base: BaseQuery,
    cache: QueryCache,
}

impl ReservationsClient {
    pub(crate) fn new(base: BaseQuery, cache: QueryCache) -> Self {
        Self { base, cache }
    }

    pub fn get_reservations(
        &self,
        params: &GetReservationsParams,
    ) -> Result<Query<GetReservationsResponse>> {
        params.validate()?;
        let base = self.base.clone();
        let pairs = params.to_query_pairs();
        self.cache.query(QueryEndpoint::GetReservations, params, move || {
            base.get("/reservations").query(pairs.clone()).execute_value()
        })
    }

    pub fn get_reservation_by_id(&self, id: &str) -> Result<Query<Reservation>> {
        let id = path_id(id)?.to_string();
        let base = self.base.clone();
        let path = format!("/reservations/{}", id);
        self.cache
            .query(QueryEndpoint::GetReservationById(id.clone()), &id, move || {
                base.get(&path).execute_value()
            })
    }

    pub fn get_reservations_stats(&self) -> Result<Query<ReservationsStats>> {
        let base = self.base.clone();
        self.cache.query(QueryEndpoint::GetReservationsStats, &Value::Null, move || {
            base.get("/reservations/stats").execute_value()
        })
    }

    /// Drivers near a pickup point, ranked by the server
    ///
    /// Issued as a POST but cached like any other read.
    pub fn get_nearby_drivers(&self, request: &NearbyDriversRequest) -> Result<Query<Vec<Driver>>> {
        if request.pickup_location.trim().is_empty() {
            return Err(Error::validation("pickupLocation is required"));
        }
        path_id(&request.reservation_id)?;

        let base = self.base.clone();
        let body = serde_json::to_value(request)?;
        self.cache.query(QueryEndpoint::GetNearbyDrivers, request, move || {
            let request = base.post("/drivers/nearby").json(&body);
            async move { request?.execute_value().await }
        })
    }

    pub fn get_available_drivers(&self) -> Result<Query<Vec<Driver>>> {
        let base = self.base.clone();
        self.cache.query(QueryEndpoint::GetAvailableDrivers, &Value::Null, move || {
            base.get("/drivers/available").execute_value()
        })
    }

    pub async fn create_reservation(&self, reservation: &CreateReservationRequest) -> Result<Reservation> {
        reservation.validate()?;
        let request = self
            .base
            .post("/reservations")
            .json(reservation)?
            .execute::<Reservation>();
        self.cache
            .mutate(MutationEndpoint::CreateReservation, request)
            .await
    }

    pub async fn update_reservation(
        &self,
        id: &str,
        patch: &UpdateReservationRequest,
    ) -> Result<Reservation> {
        let id = path_id(id)?;
        let request = self
            .base
            .patch(&format!("/reservations/{}", id))
            .json(patch)?
            .execute::<Reservation>();
        self.cache
            .mutate(MutationEndpoint::UpdateReservation(id.to_string()), request)
            .await
    }

    pub async fn delete_reservation(&self, id: &str) -> Result<DeleteReservationResponse> {
        let id = path_id(id)?;
        let request = self
            .base
            .delete(&format!("/reservations/{}", id))
            .execute::<DeleteReservationResponse>();
        self.cache
            .mutate(MutationEndpoint::DeleteReservation(id.to_string()), request)
            .await
    }

    pub async fn cancel_reservation(&self, id: &str) -> Result<Reservation> {
        let id = path_id(id)?;
        let request = self
            .base
            .patch(&format!("/reservations/{}/cancel", id))
            .execute::<Reservation>();
        self.cache
            .mutate(MutationEndpoint::CancelReservation(id.to_string()), request)
            .await
    }

    pub async fn confirm_reservation(&self, id: &str) -> Result<Reservation> {
        let id = path_id(id)?;
        let request = self
            .base
            .patch(&format!("/reservations/{}/confirm", id))
            .execute::<Reservation>();
        self.cache
            .mutate(MutationEndpoint::ConfirmReservation(id.to_string()), request)
            .await
    }

    /// Put `driver_id` on the reservation
    pub async fn assign_driver(&self, reservation_id: &str, driver_id: &str) -> Result<Reservation> {
        let reservation_id = path_id(reservation_id)?;
        let body = AssignDriverRequest {
            driver_id: path_id(driver_id)?.to_string(),
        };
        let request = self
            .base
            .patch(&format!("/reservations/{}/assign-driver", reservation_id))
            .json(&body)?
            .execute::<Reservation>();
        self.cache
            .mutate(MutationEndpoint::AssignDriver(reservation_id.to_string()), request)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use reqwest::Client;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn reservation_json(id: &str, status: &str) -> Value {
        json!({
            "id": id,
            "rider": {
                "id": 7,
                "fullName": "Ann Rider",
                "email": "ann@karnue.test",
                "phone": "555-0100",
                "city": "Austin"
            },
            "riderPhone": "555-0100",
            "pickup": "Airport",
            "destination": "Downtown",
            "scheduledDate": "2025-06-01",
            "scheduledTime": "09:30",
            "estimatedFare": "$42.00",
            "status": status,
            "driver": null,
            "vehicleType": "Sedan",
            "passengers": 2,
            "createdAt": "2025-05-20T10:00:00Z"
        })
    }

    fn client(server: &MockServer) -> ReservationsClient {
        let base = BaseQuery::new(Client::new(), &server.uri(), "/api/admin");
        ReservationsClient::new(base, QueryCache::new())
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[tokio::test]
    async fn test_date_range_is_sent_as_iso_dates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/admin/reservations"))
            .and(query_param("dateFrom", "2025-06-01"))
            .and(query_param("dateTo", "2025-06-30"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "reservations": [reservation_json("res_1", "Pending")],
                "pagination": {
                    "currentPage": 1,
                    "totalPages": 1,
                    "totalCount": 1,
                    "limit": 10,
                    "hasNext": false,
                    "hasPrev": false
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let reservations = client(&mock_server);
        let params = GetReservationsParams {
            date_from: date(2025, 6, 1),
            date_to: date(2025, 6, 30),
            ..Default::default()
        };
        let page = reservations.get_reservations(&params).unwrap().result().await.unwrap();
        assert_eq!(
            page.reservation("res_1").map(|r| r.status),
            Some(ReservationStatus::Pending)
        );
        assert!(page.reservations[0].driver.is_none());
    }

    #[tokio::test]
    async fn test_inverted_date_range_is_rejected() {
        let mock_server = MockServer::start().await;
        let reservations = client(&mock_server);

        let params = GetReservationsParams {
            date_from: date(2025, 7, 1),
            date_to: date(2025, 6, 1),
            ..Default::default()
        };
        assert!(matches!(
            reservations.get_reservations(&params),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            reservations.cancel_reservation("  ").await,
            Err(Error::Validation(_))
        ));
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_assign_driver_and_nearby_lookup() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/admin/drivers/nearby"))
            .and(body_json(json!({ "pickupLocation": "Airport", "reservationId": "res_1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": 4,
                "name": "Dana",
                "rating": 4.9,
                "status": "available",
                "vehicle": "Prius",
                "distance": "1.2 mi",
                "eta": "4 min"
            }])))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/api/admin/reservations/res_1/assign-driver"))
            .and(body_json(json!({ "driverId": "4" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(reservation_json("res_1", "Confirmed")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let reservations = client(&mock_server);
        let lookup = NearbyDriversRequest {
            pickup_location: "Airport".to_string(),
            reservation_id: "res_1".to_string(),
        };
        let nearby = reservations.get_nearby_drivers(&lookup).unwrap();
        let drivers = nearby.result().await.unwrap();
        assert_eq!(drivers[0].eta, "4 min");
        // unmounted lookups are only marked stale by the assignment
        drop(nearby);

        let updated = reservations.assign_driver("res_1", "4").await.unwrap();
        assert_eq!(updated.status, ReservationStatus::Confirmed);
    }

    #[test]
    fn test_unassign_sends_null_driver() {
        let patch = UpdateReservationRequest {
            driver: Some(None),
            notes: Some("call on arrival".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({ "driver": null, "notes": "call on arrival" })
        );
    }
}
