use super::{BandId, ItemId, Map, PiecewiseLinearFunction, Point, PwlError, Quantities, RegionId};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// A geographic region with a population
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Region {
    /// The region identifier
    pub id: RegionId,
    /// Population, which scales every regional value
    pub population: f64,
}

/// A frequency band, licensed independently in every region.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Band {
    /// The band identifier
    pub id: BandId,
    /// Number of licenses (lots) available per region
    pub lots: u32,
    /// Capacity contributed by a single lot, before synergies
    pub base_capacity: f64,
    /// Synergy factor as a function of the quantity held in one region
    pub synergy: PiecewiseLinearFunction,
}

impl Band {
    /// The synergy factor when holding `quantity` lots
    pub fn synergy_at(&self, quantity: u32) -> f64 {
        self.synergy.evaluate_clamped(quantity as f64)
    }

    /// `cap(q) = q · base_capacity · synergy(q)`
    pub fn capacity(&self, quantity: u32) -> f64 {
        quantity as f64 * self.base_capacity * self.synergy_at(quantity)
    }

    /// The capacity as a piecewise-linear function of the quantity held.
    ///
    /// Breakpoints sit at 0, at `lots`, and on both sides of every quantity
    /// where the synergy changes, so the function is exact at every integer.
    pub fn capacity_function(&self) -> Result<PiecewiseLinearFunction, PwlError> {
        let mut points = vec![Point {
            x: 0.0,
            y: self.capacity(0),
        }];
        let push = |points: &mut Vec<Point>, quantity: u32| {
            let x = quantity as f64;
            if points.last().is_none_or(|last| last.x < x) {
                points.push(Point {
                    x,
                    y: self.capacity(quantity),
                });
            }
        };

        let mut last_synergy = self.synergy_at(0);
        for quantity in 1..self.lots {
            let synergy = self.synergy_at(quantity);
            if synergy != last_synergy {
                push(&mut points, quantity - 1);
                push(&mut points, quantity);
                last_synergy = synergy;
            }
        }
        push(&mut points, self.lots);

        PiecewiseLinearFunction::new(points)
    }
}

/// A world of regions, each offering licenses in every band.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionalWorld {
    /// The regions
    pub regions: Vec<Region>,
    /// Undirected adjacency between regions
    #[cfg_attr(feature = "serde", serde(default))]
    pub adjacency: Vec<(RegionId, RegionId)>,
    /// The bands
    pub bands: Vec<Band>,
}

impl RegionalWorld {
    /// Look up a region by id
    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.iter().find(|region| region.id == id)
    }

    /// Look up a band by id
    pub fn band(&self, id: &BandId) -> Option<&Band> {
        self.bands.iter().find(|band| &band.id == id)
    }

    /// The capacity of a region when every lot of every band is held by one bidder
    pub fn maximum_regional_capacity(&self) -> f64 {
        self.bands.iter().map(|band| band.capacity(band.lots)).sum()
    }

    /// Hop distances from `home` to every reachable region (breadth-first).
    pub fn distances_from(&self, home: RegionId) -> Map<RegionId, u32> {
        let mut distances = Map::default();
        if self.region(home).is_none() {
            return distances;
        }
        distances.insert(home, 0);

        let mut queue = VecDeque::from([home]);
        while let Some(current) = queue.pop_front() {
            let next = distances[&current] + 1;
            for &(a, b) in self.adjacency.iter() {
                let neighbor = if a == current {
                    b
                } else if b == current {
                    a
                } else {
                    continue;
                };
                if !distances.contains_key(&neighbor) {
                    distances.insert(neighbor, next);
                    queue.push_back(neighbor);
                }
            }
        }
        distances
    }
}

/// A world of distinct items, each available exactly once.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemWorld {
    /// The items on offer
    pub items: Vec<ItemId>,
}

/// The auction instance's supply side.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind", rename_all = "snake_case")
)]
pub enum World {
    /// Multi-region, multi-band licenses with quantities
    MultiRegion(RegionalWorld),
    /// Single-unit items
    Items(ItemWorld),
}

impl World {
    /// A short name of the world kind, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            World::MultiRegion(_) => "multi_region",
            World::Items(_) => "items",
        }
    }

    /// Returns the regional world, if this is one
    pub fn as_regional(&self) -> Option<&RegionalWorld> {
        match self {
            World::MultiRegion(world) => Some(world),
            World::Items(_) => None,
        }
    }

    /// Returns the item world, if this is one
    pub fn as_items(&self) -> Option<&ItemWorld> {
        match self {
            World::Items(world) => Some(world),
            World::MultiRegion(_) => None,
        }
    }

    /// Every category of the world with its capacity, in a stable order
    /// (region-major for regional worlds).
    pub fn categories(&self) -> Vec<Category> {
        match self {
            World::MultiRegion(world) => world
                .regions
                .iter()
                .flat_map(|region| {
                    world.bands.iter().map(move |band| Category {
                        id: CategoryId::License {
                            region: region.id,
                            band: band.id.clone(),
                        },
                        capacity: band.lots,
                    })
                })
                .collect(),
            World::Items(world) => world
                .items
                .iter()
                .map(|&item| Category {
                    id: CategoryId::Item(item),
                    capacity: 1,
                })
                .collect(),
        }
    }

    /// The bundle containing every category at full capacity
    pub fn full_bundle(&self) -> Quantities {
        self.categories()
            .into_iter()
            .map(|category| (category.id, category.capacity))
            .collect()
    }
}

/// A tradeable category together with its supply
#[derive(Clone, Debug, PartialEq)]
pub struct Category {
    /// The category key
    pub id: CategoryId,
    /// How many units exist
    pub capacity: u32,
}

/// Key of a tradeable category.
///
/// Rendered as `r<region>:<band>` for licenses and `i<item>` for items, which
/// is also the serialized form (so it may key JSON objects).
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum CategoryId {
    /// A license of a band in a region
    License {
        /// The region
        region: RegionId,
        /// The band
        band: BandId,
    },
    /// A single item
    Item(ItemId),
}

impl CategoryId {
    /// A compact form safe to embed into variable names
    pub fn var_suffix(&self) -> String {
        match self {
            CategoryId::License { region, band } => format!("{region}_{band}"),
            CategoryId::Item(item) => item.to_string(),
        }
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryId::License { region, band } => write!(f, "{region}:{band}"),
            CategoryId::Item(item) => write!(f, "{item}"),
        }
    }
}

/// Failure to parse a [`CategoryId`]
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("invalid category id `{0}`, expected `r<region>:<band>` or `i<item>`")]
pub struct CategoryIdError(String);

impl FromStr for CategoryId {
    type Err = CategoryIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || CategoryIdError(value.to_owned());
        if let Some((region, band)) = value.split_once(':') {
            let region = region
                .strip_prefix('r')
                .and_then(|n| n.parse::<u32>().ok())
                .ok_or_else(invalid)?;
            if band.is_empty() {
                return Err(invalid());
            }
            Ok(CategoryId::License {
                region: RegionId(region),
                band: BandId::from(band),
            })
        } else {
            value
                .strip_prefix('i')
                .and_then(|n| n.parse::<u32>().ok())
                .map(|item| CategoryId::Item(ItemId(item)))
                .ok_or_else(invalid)
        }
    }
}

impl TryFrom<String> for CategoryId {
    type Error = CategoryIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CategoryId> for String {
    fn from(value: CategoryId) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(id: &str, lots: u32, base_capacity: f64, synergy: &[(f64, f64)]) -> Band {
        Band {
            id: BandId::from(id),
            lots,
            base_capacity,
            synergy: PiecewiseLinearFunction::from_pairs(synergy.iter().copied()).unwrap(),
        }
    }

    fn line_world() -> RegionalWorld {
        RegionalWorld {
            regions: (0..4)
                .map(|r| Region {
                    id: RegionId(r),
                    population: 100.0,
                })
                .collect(),
            adjacency: vec![
                (RegionId(0), RegionId(1)),
                (RegionId(2), RegionId(1)),
                (RegionId(2), RegionId(3)),
            ],
            bands: vec![
                band("A", 2, 20.0, &[(0.0, 0.0), (2.0, 2.0)]),
                band("B", 6, 10.0, &[(0.0, 1.0), (6.0, 1.0)]),
            ],
        }
    }

    #[test]
    fn capacity_function_breakpoints() {
        let world = line_world();
        let a = world.bands[0].capacity_function().unwrap();
        assert_eq!(
            a.points(),
            &[
                Point { x: 0.0, y: 0.0 },
                Point { x: 1.0, y: 20.0 },
                Point { x: 2.0, y: 80.0 }
            ]
        );
        let b = world.bands[1].capacity_function().unwrap();
        assert_eq!(
            b.points(),
            &[Point { x: 0.0, y: 0.0 }, Point { x: 6.0, y: 60.0 }]
        );
        assert_eq!(world.maximum_regional_capacity(), 140.0);
    }

    #[test]
    fn step_synergy_adds_both_sides() {
        // synergy jumps from 1 to 1.5 between 2 and 3 lots
        let b = band("C", 5, 10.0, &[(0.0, 1.0), (2.0, 1.0), (3.0, 1.5), (5.0, 1.5)]);
        let f = b.capacity_function().unwrap();
        let xs: Vec<f64> = f.points().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 2.0, 3.0, 5.0]);
        for q in 0..=5 {
            assert_eq!(f.evaluate(q as f64), Some(b.capacity(q)));
        }
    }

    #[test]
    fn single_lot_band() {
        let b = band("D", 1, 7.0, &[(0.0, 1.0), (1.0, 1.0)]);
        let f = b.capacity_function().unwrap();
        assert_eq!(f.points(), &[Point { x: 0.0, y: 0.0 }, Point { x: 1.0, y: 7.0 }]);
    }

    #[test]
    fn breadth_first_distances() {
        let world = line_world();
        let distances = world.distances_from(RegionId(0));
        assert_eq!(distances.get(&RegionId(0)), Some(&0));
        assert_eq!(distances.get(&RegionId(1)), Some(&1));
        assert_eq!(distances.get(&RegionId(2)), Some(&2));
        assert_eq!(distances.get(&RegionId(3)), Some(&3));
        assert!(world.distances_from(RegionId(9)).is_empty());
    }

    #[test]
    fn categories_are_region_major() {
        let world = World::MultiRegion(line_world());
        let categories = world.categories();
        assert_eq!(categories.len(), 8);
        assert_eq!(
            categories[1].id,
            CategoryId::License {
                region: RegionId(0),
                band: BandId::from("B")
            }
        );
        assert_eq!(categories[1].capacity, 6);
    }

    #[test]
    fn category_id_text_form() {
        let license = CategoryId::License {
            region: RegionId(2),
            band: BandId::from("HIGH_PAIRED"),
        };
        assert_eq!(license.to_string(), "r2:HIGH_PAIRED");
        assert_eq!("r2:HIGH_PAIRED".parse::<CategoryId>().unwrap(), license);
        assert_eq!(license.var_suffix(), "r2_HIGH_PAIRED");
        assert_eq!("i4".parse::<CategoryId>().unwrap(), CategoryId::Item(ItemId(4)));
        assert!("x4".parse::<CategoryId>().is_err());
        assert!("r1:".parse::<CategoryId>().is_err());
    }

    #[test]
    fn world_json() {
        let json = r#"{
            "kind": "items",
            "items": [0, 1]
        }"#;
        let world: World = serde_json::from_str(json).unwrap();
        assert_eq!(world.categories().len(), 2);
        assert_eq!(world.kind(), "items");
    }
}
