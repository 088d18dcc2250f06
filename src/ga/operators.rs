//! Permutation-preserving genetic operators for routes.
//!
//! # Crossover
//!
//! - [`pmx_crossover`] (PMX): after Goldberg & Lingle (1985). Keeps the
//!   absolute positions of a middle segment and repairs the rest through the
//!   segment mapping
//!
//! # Mutation
//!
//! - [`Mutation::Swap`]: exchange two distinct positions, O(n) rescoring
//! - [`Mutation::Inversion`]: reverse a random segment (2-opt move), O(n)
//! - [`Mutation::Scramble`]: Fisher–Yates shuffle of a random segment, O(n)
//!
//! Operators never touch their inputs. Crossover builds new routes; mutation
//! either hands the input route back untouched or mutates a copy.
//!
//! # References
//!
//! - Goldberg & Lingle (1985), "Alleles, Loci, and the Traveling Salesman Problem"
//! - Cicirello (2023), "Genetic Operators for Permutation Representation"

use super::route::Route;
use crate::error::{TspError, TspResult};
use crate::graph::City;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

// ============================================================================
// Crossover
// ============================================================================

/// Partially Mapped Crossover (PMX) with fixed cut points.
///
/// Offspring 1 takes `parent1[point1..point2]` verbatim and the rest from
/// `parent2`; offspring 2 is the mirror image. Offspring 1 keeps parent 1's
/// start city and offspring 2 keeps parent 2's.
///
/// # Algorithm
///
/// For each offspring, with *template* the parent supplying the segment and
/// *donor* the other one:
///
/// 1. Copy `template[point1..point2]` into the child at the same positions
/// 2. Map the segment positions `donor[i] → template[i]`
/// 3. For every position outside the segment take `donor[i]`; while that
///    city is already in the child, follow the mapping from step 2. A city
///    with no mapping entry (or a chain longer than the segment) falls back
///    to the donor's first city not yet placed
/// 4. Fill any position still empty with the donor's first unplaced city
///
/// A conflicting city sits outside the donor's segment and is therefore never
/// a mapping key, so conflicts are settled by the fallback of step 3 and
/// offspring follow donor order for the displaced cities.
///
/// # Errors
///
/// - [`TspError::InvalidCrossoverPoints`] unless `point1 < point2 <= len`
/// - [`TspError::ParentMismatch`] if the parents differ in start city or
///   city set
///
/// # Complexity
/// O(n) time, O(n) space
pub fn pmx_crossover(
    parent1: &Route,
    parent2: &Route,
    point1: usize,
    point2: usize,
) -> TspResult<(Route, Route)> {
    let n = parent1.len();
    if point1 >= point2 || point2 > n {
        return Err(TspError::InvalidCrossoverPoints {
            point1,
            point2,
            route_len: n,
        });
    }
    if !parent1.is_permutation_of(parent2) {
        return Err(TspError::ParentMismatch(format!(
            "{} vs {}",
            parent1.city_names().join("-"),
            parent2.city_names().join("-")
        )));
    }

    let child1 = pmx_build_child(parent1, parent2, point1, point2)?;
    let child2 = pmx_build_child(parent2, parent1, point1, point2)?;
    Ok((child1, child2))
}

/// Build one PMX child: segment from `template`, everything else mapped
/// from `donor`.
fn pmx_build_child(
    template: &Route,
    donor: &Route,
    point1: usize,
    point2: usize,
) -> TspResult<Route> {
    let n = template.len();
    let mut child: Vec<Option<Arc<City>>> = vec![None; n];
    let mut placed: HashSet<&str> = HashSet::with_capacity(n);

    // Step 1: copy the segment
    for i in point1..point2 {
        let city = template.city(i);
        child[i] = Some(Arc::clone(city));
        placed.insert(city.id());
    }

    // Step 2: donor city -> template city at the same locus
    let mapping: HashMap<&str, &Arc<City>> = (point1..point2)
        .map(|i| (donor.city(i).id(), template.city(i)))
        .collect();

    // Step 3: fill outside the segment, repairing conflicts
    let segment_len = point2 - point1;
    for i in (0..point1).chain(point2..n) {
        let mut candidate = donor.city(i);
        let mut steps = 0;
        while placed.contains(candidate.id()) {
            match mapping.get(candidate.id()) {
                Some(&next) if steps < segment_len => {
                    candidate = next;
                    steps += 1;
                }
                _ => match first_unplaced(donor, &placed) {
                    Some(city) => {
                        candidate = city;
                        break;
                    }
                    None => break,
                },
            }
        }
        if !placed.contains(candidate.id()) {
            placed.insert(candidate.id());
            child[i] = Some(Arc::clone(candidate));
        }
    }

    // Step 4: fill any hole left by an unresolved chain
    for i in 0..n {
        if child[i].is_none() {
            if let Some(city) = first_unplaced(donor, &placed) {
                placed.insert(city.id());
                child[i] = Some(Arc::clone(city));
            }
        }
    }

    let cities = child
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| {
            TspError::ParentMismatch("PMX could not complete the offspring".into())
        })?;
    Route::new(
        Arc::clone(template.start_city()),
        cities,
        Arc::clone(template.distance_table()),
    )
}

/// First city of `donor` not in `placed`.
fn first_unplaced<'a>(donor: &'a Route, placed: &HashSet<&str>) -> Option<&'a Arc<City>> {
    donor.cities().iter().find(|c| !placed.contains(c.id()))
}

// ============================================================================
// Mutation
// ============================================================================

/// Mutation strategy.
///
/// All strategies only reorder existing cities, so the permutation
/// invariant holds by construction. Routes shorter than 2 are never changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mutation {
    /// Exchange the cities at two distinct random positions.
    #[default]
    Swap,

    /// Reverse the inclusive segment between two random positions.
    Inversion,

    /// Shuffle the inclusive segment between two random positions.
    Scramble,
}

impl Mutation {
    /// Applies the mutation with probability `rate` (clamped to `[0, 1]`).
    ///
    /// With probability `1 - rate` the route is returned as-is, without a
    /// copy. Otherwise a copy is mutated and returned.
    pub fn mutate<R: Rng>(&self, route: Route, rate: f64, rng: &mut R) -> Route {
        let rate = if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) };
        if !rng.random_bool(rate) || route.len() < 2 {
            return route;
        }

        let mut mutated = route.clone();
        match self {
            Mutation::Swap => swap_mutation(&mut mutated, rng),
            Mutation::Inversion => inversion_mutation(&mut mutated, rng),
            Mutation::Scramble => scramble_mutation(&mut mutated, rng),
        }
        mutated
    }
}

/// Swap two distinct random positions.
fn swap_mutation<R: Rng>(route: &mut Route, rng: &mut R) {
    let n = route.len();
    let i = rng.random_range(0..n);
    // shift by 1..n so that j != i
    let j = (i + rng.random_range(1..n)) % n;
    route.rearrange(|cities| cities.swap(i, j));
}

/// Reverse a random inclusive segment.
fn inversion_mutation<R: Rng>(route: &mut Route, rng: &mut R) {
    let (start, end) = random_segment(route.len(), rng);
    route.rearrange(|cities| cities[start..=end].reverse());
}

/// Fisher–Yates shuffle of a random inclusive segment.
fn scramble_mutation<R: Rng>(route: &mut Route, rng: &mut R) {
    let (start, end) = random_segment(route.len(), rng);
    route.rearrange(|cities| cities[start..=end].shuffle(rng));
}

// ============================================================================
// Helpers
// ============================================================================

/// Pick a random segment `[start, end]` within `0..n` where `start <= end`.
fn random_segment<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
    let a = rng.random_range(0..n);
    let b = rng.random_range(0..n);
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

// ============================================================================
// Tests
// ============================================================================
