//! Coincidence grouping of visible points.

use std::collections::HashMap;

use crate::coord::{CoordinateKey, LatLon};

/// Points sharing one coordinate key, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct CoincidenceGroup<T> {
    key: CoordinateKey,
    members: Vec<T>,
}

impl<T> CoincidenceGroup<T> {
    /// The shared coordinate key.
    pub fn key(&self) -> CoordinateKey {
        self.key
    }

    /// Base coordinate the group is drawn around (the rounded key).
    pub fn base(&self) -> LatLon {
        self.key.base()
    }

    /// Members in the order they were supplied.
    pub fn members(&self) -> &[T] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether more than one point shares this key.
    pub fn is_coincident(&self) -> bool {
        self.members.len() > 1
    }
}

/// All coincidence groups of a point set, in first-appearance order.
#[derive(Debug, Clone, PartialEq)]
pub struct CoincidenceGroups<T> {
    groups: Vec<CoincidenceGroup<T>>,
    index: HashMap<CoordinateKey, usize>,
}

impl<T> CoincidenceGroups<T> {
    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of grouped points.
    pub fn member_count(&self) -> usize {
        self.groups.iter().map(CoincidenceGroup::len).sum()
    }

    /// Group for a key, if any point rounds to it.
    pub fn get(&self, key: &CoordinateKey) -> Option<&CoincidenceGroup<T>> {
        self.index.get(key).map(|&i| &self.groups[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CoincidenceGroup<T>> {
        self.groups.iter()
    }
}

impl<T> Default for CoincidenceGroups<T> {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<'a, T> IntoIterator for &'a CoincidenceGroups<T> {
    type Item = &'a CoincidenceGroup<T>;
    type IntoIter = std::slice::Iter<'a, CoincidenceGroup<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

impl<T> IntoIterator for CoincidenceGroups<T> {
    type Item = CoincidenceGroup<T>;
    type IntoIter = std::vec::IntoIter<CoincidenceGroup<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

/// Partition points into groups of identical rounded coordinates.
///
/// Group order follows the first appearance of each key and member order
/// follows input order, so the same input always yields the same groups.
/// Runs in linear time.
pub fn group_coincident<T, I>(points: I) -> CoincidenceGroups<T>
where
    I: IntoIterator<Item = (T, LatLon)>,
{
    let mut groups = CoincidenceGroups::default();

    for (id, coord) in points {
        let key = coord.key();
        match groups.index.get(&key) {
            Some(&i) => groups.groups[i].members.push(id),
            None => {
                groups.index.insert(key, groups.groups.len());
                groups.groups.push(CoincidenceGroup {
                    key,
                    members: vec![id],
                });
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_input_yields_no_groups() {
        let groups = group_coincident(Vec::<(u32, LatLon)>::new());
        assert!(groups.is_empty());
        assert_eq!(groups.member_count(), 0);
    }

    #[test]
    fn rounding_tolerance() {
        let groups = group_coincident([
            ("a", LatLon::new(48.85661, 2.35222)),
            ("b", LatLon::new(48.856608, 2.352221)),
            ("c", LatLon::new(48.85700, 2.35222)),
        ]);

        assert_eq!(groups.len(), 2);
        let first = groups.get(&LatLon::new(48.85661, 2.35222).key()).unwrap();
        assert_eq!(first.members(), &["a", "b"]);
        assert!(first.is_coincident());

        let second = groups.get(&LatLon::new(48.857, 2.35222).key()).unwrap();
        assert_eq!(second.members(), &["c"]);
        assert!(!second.is_coincident());
    }

    #[test]
    fn six_decimal_halves_split_on_stored_value() {
        let groups = group_coincident([
            ("a", LatLon::new(45.000015, 2.0)),
            ("b", LatLon::new(45.000024, 2.0)),
        ]);

        assert_eq!(groups.len(), 2);
        let first = groups.iter().next().unwrap();
        assert_eq!(first.key().to_string(), "45.00001,2.00000");
        assert_eq!(first.members(), &["a"]);
    }

    #[test]
    fn groups_follow_first_appearance() {
        let lyon = LatLon::new(45.764, 4.8357);
        let lille = LatLon::new(50.6292, 3.0573);
        let groups = group_coincident([(0, lyon), (1, lille), (2, lyon), (3, lille), (4, lyon)]);

        let order: Vec<_> = groups.iter().map(|g| g.members().to_vec()).collect();
        assert_eq!(order, vec![vec![0, 2, 4], vec![1, 3]]);
    }

    #[test]
    fn base_is_rounded_key() {
        let groups = group_coincident([(7, LatLon::new(48.856608, 2.352221))]);
        let group = groups.iter().next().unwrap();
        assert_eq!(group.base(), group.key().base());
        assert!((group.base().lat - 48.85661).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn membership_is_preserved(
            points in prop::collection::vec((-60.0f64..60.0, -170.0f64..170.0), 0..200)
        ) {
            let input: Vec<_> = points
                .iter()
                .enumerate()
                .map(|(i, &(lat, lon))| (i, LatLon::new(lat, lon)))
                .collect();
            let groups = group_coincident(input.clone());

            prop_assert_eq!(groups.member_count(), input.len());
            for group in &groups {
                prop_assert!(!group.is_empty());
                for &id in group.members() {
                    prop_assert_eq!(input[id].1.key(), group.key());
                }
                // Members keep input order within a group.
                prop_assert!(group.members().windows(2).all(|w| w[0] < w[1]));
            }
        }

        #[test]
        fn grouping_is_deterministic(
            points in prop::collection::vec((0u8..4, 0u8..4), 0..64)
        ) {
            // A small grid forces many collisions.
            let input: Vec<_> = points
                .iter()
                .enumerate()
                .map(|(i, &(a, b))| (i, LatLon::new(45.0 + a as f64 * 1e-3, 2.0 + b as f64 * 1e-3)))
                .collect();
            prop_assert_eq!(group_coincident(input.clone()), group_coincident(input));
        }
    }
}
