//! Brute-force K-nearest-user ranking.
//!
//! Every query scans the full user list. The dataset is small and static, so
//! no spatial index is maintained.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::geo::{round_to, validate, Coordinate};
use crate::store::{User, UserStore};

/// Number of users returned when the caller does not specify `k`.
pub const DEFAULT_K: i64 = 5;

/// A user together with its distance from the query point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedUser {
    #[serde(flatten)]
    pub user: User,
    /// Distance in kilometres, rounded to two decimals.
    pub distance_km: f64,
}

/// Result of a nearby query, as exposed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyUsers {
    pub current_location: Coordinate,
    pub count: usize,
    pub users: Vec<RankedUser>,
}

/// Rank `users` by distance from `query` and keep the closest `k`.
///
/// `k` larger than the number of users is clamped silently. Ties keep the
/// order of `users`, so repeated calls return identical output.
///
/// # Errors
///
/// Returns [`Error::Validation`] when `query` is out of range, when `k < 1`,
/// or when `users` is empty.
pub fn find_nearest(query: Coordinate, users: &[User], k: i64) -> Result<Vec<RankedUser>> {
    if !validate(query) {
        return Err(Error::validation("Invalid coordinates"));
    }
    if k < 1 {
        return Err(Error::validation("K must be at least 1"));
    }
    if users.is_empty() {
        return Err(Error::validation("No users found"));
    }

    let mut scored: Vec<(&User, f64)> = users
        .iter()
        .map(|user| (user, query.distance_to(&user.coordinate())))
        .collect();

    // `sort_by` is stable; equal distances keep dataset order.
    scored.sort_by(|a, b| a.1.total_cmp(&b.1));

    let limit = usize::try_from(k).unwrap_or(usize::MAX).min(scored.len());
    debug!(
        query = %query,
        k,
        candidates = scored.len(),
        returned = limit,
        "ranked users by distance"
    );

    Ok(scored
        .into_iter()
        .take(limit)
        .map(|(user, km)| RankedUser {
            user: user.clone(),
            distance_km: round_to(km, 2),
        })
        .collect())
}

/// Run [`find_nearest`] against a store and wrap the result.
pub fn nearby_users(store: &UserStore, query: Coordinate, k: i64) -> Result<NearbyUsers> {
    let users = find_nearest(query, store.all(), k)?;
    Ok(NearbyUsers {
        current_location: query,
        count: users.len(),
        users,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Vec<User> {
        vec![
            User::new(1, "far", 10.0, 10.0),
            User::new(2, "near", 0.1, 0.1),
            User::new(3, "origin", 0.0, 0.0),
            User::new(4, "mid", 1.0, 1.0),
        ]
    }

    #[test]
    fn single_user_at_query_point() {
        let users = vec![User::new(1, "A", 0.0, 0.0)];
        let ranked = find_nearest(Coordinate::new(0.0, 0.0), &users, 1).unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].user.id, 1);
        assert_eq!(ranked[0].distance_km, 0.0);
    }

    #[test]
    fn sorted_ascending() {
        let ranked = find_nearest(Coordinate::new(0.0, 0.0), &grid(), 4).unwrap();
        let ids: Vec<_> = ranked.iter().map(|r| r.user.id).collect();
        assert_eq!(ids, vec![3, 2, 4, 1]);
    }

    #[test]
    fn k_is_clamped_to_user_count() {
        let ranked = find_nearest(Coordinate::new(0.0, 0.0), &grid(), 100).unwrap();
        assert_eq!(ranked.len(), 4);
        let ranked = find_nearest(Coordinate::new(0.0, 0.0), &grid(), i64::MAX).unwrap();
        assert_eq!(ranked.len(), 4);
    }

    #[test]
    fn ties_keep_input_order() {
        let users = vec![
            User::new(10, "first", 1.0, 1.0),
            User::new(11, "second", 1.0, 1.0),
            User::new(12, "third", 1.0, 1.0),
        ];
        let ranked = find_nearest(Coordinate::new(0.0, 0.0), &users, 3).unwrap();
        let ids: Vec<_> = ranked.iter().map(|r| r.user.id).collect();
        assert_eq!(ids, vec![10, 11, 12]);
    }

    #[test]
    fn zero_k_is_rejected() {
        let err = find_nearest(Coordinate::new(0.0, 0.0), &grid(), 0).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        let err = find_nearest(Coordinate::new(0.0, 0.0), &grid(), -3).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn invalid_latitude_is_rejected() {
        let err = find_nearest(Coordinate::new(91.0, 0.0), &grid(), 1).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert!(err.to_string().contains("Invalid coordinates"));
    }

    #[test]
    fn empty_user_list_is_rejected() {
        let err = find_nearest(Coordinate::new(0.0, 0.0), &[], 1).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn nearby_users_count_matches_users() {
        let store = UserStore::new(grid()).unwrap();
        let result = nearby_users(&store, Coordinate::new(0.0, 0.0), 2).unwrap();
        assert_eq!(result.count, 2);
        assert_eq!(result.users.len(), 2);
        assert_eq!(result.current_location, Coordinate::new(0.0, 0.0));
    }

    #[test]
    fn ranked_user_serializes_flat() {
        let ranked = RankedUser {
            user: User::new(1, "Alice Johnson", 40.7128, -74.006),
            distance_km: 0.0,
        };
        let json = serde_json::to_value(&ranked).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["username"], "Alice Johnson");
        assert_eq!(json["distance_km"], 0.0);
        assert!(json.get("user").is_none());
    }
}
