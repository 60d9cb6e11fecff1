//! City coordinates and the Euclidean distance model.
//!
//! A [`CityMap`] interns city ids to dense indices `0..n` in insertion order.
//! Engines never hash names in their inner loops; they work on index
//! permutations against a precomputed [`DistanceMatrix`]. Name-based lookups
//! are only used at the boundary, and unknown names are a hard error.

use crate::error::{TspError, TspResult};
use crate::tour::Tour;
use rand::Rng;
use std::collections::HashMap;

/// Minimum spacing kept between randomly placed cities.
const RANDOM_CITY_MIN_SEPARATION: f64 = 30.0;

/// Placement attempts before a random city ignores the spacing rule.
const RANDOM_CITY_ATTEMPTS: usize = 10;

/// A point in the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Named cities with 2-D coordinates.
///
/// Ids are unique. Iteration order (and therefore index assignment) is the
/// insertion order.
///
/// # Examples
///
/// ```
/// use u_tsp::geometry::CityMap;
///
/// let cities = CityMap::from_pairs([("A", 0.0, 0.0), ("B", 3.0, 4.0)]).unwrap();
/// assert_eq!(cities.distance("A", "B").unwrap(), 5.0);
/// assert!(cities.distance("A", "Z").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CityMap {
    ids: Vec<String>,
    points: Vec<Point>,
    index: HashMap<String, usize>,
}

impl CityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from `(id, x, y)` triples.
    ///
    /// Fails with [`TspError::DuplicateCity`] on a repeated id.
    pub fn from_pairs<I, S>(cities: I) -> TspResult<Self>
    where
        I: IntoIterator<Item = (S, f64, f64)>,
        S: Into<String>,
    {
        let mut map = Self::new();
        for (id, x, y) in cities {
            map.insert(id, x, y)?;
        }
        Ok(map)
    }

    /// The fourteen-city demo layout (A through N).
    pub fn demo() -> Self {
        let layout = [
            ("A", 50.0, 50.0),
            ("B", 100.0, 150.0),
            ("C", 200.0, 100.0),
            ("D", 150.0, 200.0),
            ("E", 250.0, 250.0),
            ("F", 300.0, 50.0),
            ("G", 350.0, 200.0),
            ("H", 400.0, 150.0),
            ("I", 450.0, 250.0),
            ("J", 500.0, 100.0),
            ("K", 600.0, 600.0),
            ("L", 550.0, 50.0),
            ("M", 20.0, 650.0),
            ("N", 300.0, 700.0),
        ];
        let mut map = Self::new();
        for (id, x, y) in layout {
            map.ids.push(id.to_string());
            map.points.push(Point::new(x, y));
            map.index.insert(id.to_string(), map.ids.len() - 1);
        }
        map
    }

    /// Adds a city and returns its index.
    pub fn insert(&mut self, id: impl Into<String>, x: f64, y: f64) -> TspResult<usize> {
        let id = id.into();
        if self.index.contains_key(&id) {
            return Err(TspError::DuplicateCity(id));
        }
        let idx = self.ids.len();
        self.index.insert(id.clone(), idx);
        self.ids.push(id);
        self.points.push(Point::new(x, y));
        Ok(idx)
    }

    /// Adds a city with the next free name at a random position.
    ///
    /// Names are tried in order `A..Z`, then `AA..ZZ`. The position is drawn
    /// from `[min.x, max.x] x [min.y, max.y]` and kept at least 30 units away
    /// from every existing city; after 10 rejected draws the spacing rule is
    /// dropped. Returns the new city's id.
    pub fn add_random_city<R: Rng>(
        &mut self,
        min: Point,
        max: Point,
        rng: &mut R,
    ) -> TspResult<String> {
        if !(min.x <= max.x && min.y <= max.y) {
            return Err(TspError::InvalidParameter(format!(
                "random city bounds are empty: {min:?}..{max:?}"
            )));
        }
        let id = self.next_free_name().ok_or_else(|| {
            TspError::InvalidParameter("all generated city names are taken".into())
        })?;

        let mut draw = || {
            Point::new(
                rng.random_range(min.x..=max.x),
                rng.random_range(min.y..=max.y),
            )
        };
        let mut point = draw();
        for _ in 1..RANDOM_CITY_ATTEMPTS {
            let crowded = self
                .points
                .iter()
                .any(|p| p.distance_to(&point) < RANDOM_CITY_MIN_SEPARATION);
            if !crowded {
                break;
            }
            point = draw();
        }

        self.insert(id.clone(), point.x, point.y)?;
        Ok(id)
    }

    fn next_free_name(&self) -> Option<String> {
        let letters = || (b'A'..=b'Z').map(char::from);
        letters()
            .map(String::from)
            .chain(letters().flat_map(move |a| letters().map(move |b| format!("{a}{b}"))))
            .find(|name| !self.index.contains_key(name))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// City ids in index order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Id of the city at `idx`.
    ///
    /// # Panics
    /// Panics if `idx >= len()`.
    pub fn id(&self, idx: usize) -> &str {
        &self.ids[idx]
    }

    /// Coordinates of the city at `idx`.
    ///
    /// # Panics
    /// Panics if `idx >= len()`.
    pub fn point(&self, idx: usize) -> Point {
        self.points[idx]
    }

    /// Coordinates of a named city, if present.
    pub fn get(&self, id: &str) -> Option<Point> {
        self.index.get(id).map(|&i| self.points[i])
    }

    /// Index of a named city.
    pub fn index_of(&self, id: &str) -> TspResult<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| TspError::UnknownCity(id.to_string()))
    }

    /// `(id, point)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Point)> {
        self.ids.iter().map(String::as_str).zip(self.points.iter().copied())
    }

    /// Euclidean distance between two named cities.
    pub fn distance(&self, a: &str, b: &str) -> TspResult<f64> {
        let pa = self.points[self.index_of(a)?];
        let pb = self.points[self.index_of(b)?];
        Ok(pa.distance_to(&pb))
    }

    /// Cyclic length of a named city sequence.
    ///
    /// Sequences shorter than two cities have length 0.
    pub fn tour_length<S: AsRef<str>>(&self, ids: &[S]) -> TspResult<f64> {
        if ids.len() < 2 {
            // Still reject unknown names in degenerate sequences.
            for id in ids {
                self.index_of(id.as_ref())?;
            }
            return Ok(0.0);
        }
        let mut total = 0.0;
        for i in 0..ids.len() {
            let next = (i + 1) % ids.len();
            total += self.distance(ids[i].as_ref(), ids[next].as_ref())?;
        }
        Ok(total)
    }

    /// Converts a named sequence into a validated, evaluated [`Tour`].
    ///
    /// The sequence must be a permutation of every city in the map.
    pub fn tour_from_ids<S: AsRef<str>>(&self, ids: &[S]) -> TspResult<Tour> {
        let order = ids
            .iter()
            .map(|id| self.index_of(id.as_ref()))
            .collect::<TspResult<Vec<_>>>()?;
        Tour::from_order(order, &self.distance_matrix())
    }

    /// Precomputes all pairwise distances.
    pub fn distance_matrix(&self) -> DistanceMatrix {
        DistanceMatrix::from_points(&self.points)
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    //! `CityMap` serializes as an ordered `{ "id": [x, y] }` mapping.

    use super::CityMap;
    use serde::de::{Error as _, MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;

    impl Serialize for CityMap {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.len()))?;
            for (id, p) in self.iter() {
                map.serialize_entry(id, &[p.x, p.y])?;
            }
            map.end()
        }
    }

    struct CityMapVisitor;

    impl<'de> Visitor<'de> for CityMapVisitor {
        type Value = CityMap;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of city id to [x, y]")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<CityMap, A::Error> {
            let mut cities = CityMap::new();
            while let Some((id, (x, y))) = access.next_entry::<String, (f64, f64)>()? {
                cities.insert(id, x, y).map_err(A::Error::custom)?;
            }
            Ok(cities)
        }
    }

    impl<'de> Deserialize<'de> for CityMap {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_map(CityMapVisitor)
        }
    }

}

/// Dense symmetric matrix of pairwise Euclidean distances.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    pub fn from_points(points: &[Point]) -> Self {
        let n = points.len();
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = points[i].distance_to(&points[j]);
                data[i * n + j] = d;
                data[j * n + i] = d;
            }
        }
        Self { n, data }
    }

    /// Number of cities.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Distance between city indices `i` and `j`.
    ///
    /// # Panics
    /// Panics if either index is out of range.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    /// Cyclic length of an index sequence, closing edge included.
    ///
    /// Sequences shorter than two cities have length 0.
    pub fn tour_length(&self, order: &[usize]) -> f64 {
        if order.len() < 2 {
            return 0.0;
        }
        let closing = self.get(order[order.len() - 1], order[0]);
        order.windows(2).map(|w| self.get(w[0], w[1])).sum::<f64>() + closing
    }
}
