//! Astronomy tool serving curated solar-system and constellation data.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use serde_json::{json, Value};

use crate::error::ToolError;
use crate::tool::{unknown_function, FunctionSpec, Tool, ToolArgs};

const FUNCTIONS: &[FunctionSpec] = &[
    FunctionSpec {
        name: "get_planet_info",
        description: "Get facts about a planet in the solar system",
        params: "planet (string, required): planet name, e.g. Mars",
    },
    FunctionSpec {
        name: "get_visible_constellations",
        description: "List constellations best visible for the season of a date",
        params: "date (string, optional, default today): YYYY-MM-DD",
    },
];

struct PlanetFacts {
    name: &'static str,
    kind: &'static str,
    diameter_km: u32,
    orbital_period: &'static str,
    rotation_period: &'static str,
    average_temperature: &'static str,
    moons: u32,
    rings: bool,
    description: &'static str,
    facts: &'static [&'static str],
}

/// Solar-system planets, Earth excluded.
const PLANETS: &[PlanetFacts] = &[
    PlanetFacts {
        name: "Mercury",
        kind: "Terrestrial planet",
        diameter_km: 4_879,
        orbital_period: "88 Earth days",
        rotation_period: "59 Earth days",
        average_temperature: "167°C (ranging from -180°C to 430°C)",
        moons: 0,
        rings: false,
        description: "The smallest planet in our solar system and closest to the Sun",
        facts: &[
            "Has no atmosphere and no moons",
            "Surface is heavily cratered, similar to Earth's Moon",
            "Contains ice in permanently shadowed craters at its poles",
        ],
    },
    PlanetFacts {
        name: "Venus",
        kind: "Terrestrial planet",
        diameter_km: 12_104,
        orbital_period: "225 Earth days",
        rotation_period: "243 Earth days",
        average_temperature: "462°C",
        moons: 0,
        rings: false,
        description: "Often called Earth's sister planet due to similar size",
        facts: &[
            "Rotates backwards compared to most planets",
            "Hottest planet in our solar system due to greenhouse effect",
            "Covered in thick clouds of sulfuric acid",
        ],
    },
    PlanetFacts {
        name: "Mars",
        kind: "Terrestrial planet",
        diameter_km: 6_792,
        orbital_period: "687 Earth days",
        rotation_period: "24 hours 37 minutes",
        average_temperature: "-63°C",
        moons: 2,
        rings: false,
        description: "The Red Planet, named after the Roman god of war",
        facts: &[
            "Has the largest volcano in the solar system (Olympus Mons)",
            "Shows evidence of ancient river valleys and lakes",
            "Experiences planet-wide dust storms",
        ],
    },
    PlanetFacts {
        name: "Jupiter",
        kind: "Gas giant",
        diameter_km: 142_984,
        orbital_period: "11.9 Earth years",
        rotation_period: "9 hours 56 minutes",
        average_temperature: "-110°C",
        moons: 79,
        rings: true,
        description: "The largest planet in our solar system",
        facts: &[
            "Has a Great Red Spot, a giant storm lasting over 400 years",
            "Has at least 79 moons, including the four large Galilean moons",
            "Emits more energy than it receives from the Sun",
        ],
    },
    PlanetFacts {
        name: "Saturn",
        kind: "Gas giant",
        diameter_km: 120_536,
        orbital_period: "29.5 Earth years",
        rotation_period: "10 hours 42 minutes",
        average_temperature: "-140°C",
        moons: 82,
        rings: true,
        description: "Known for its spectacular ring system",
        facts: &[
            "Has the most extensive ring system of any planet",
            "Has a hexagonal storm at its north pole",
            "Largest moon Titan has a thick atmosphere",
        ],
    },
    PlanetFacts {
        name: "Uranus",
        kind: "Ice giant",
        diameter_km: 51_118,
        orbital_period: "84 Earth years",
        rotation_period: "17 hours 14 minutes",
        average_temperature: "-195°C",
        moons: 27,
        rings: true,
        description: "The tilted planet, rotating on its side",
        facts: &[
            "Rotates on its side with an axial tilt of 98 degrees",
            "First planet discovered with a telescope",
            "Appears blue-green due to methane in its atmosphere",
        ],
    },
    PlanetFacts {
        name: "Neptune",
        kind: "Ice giant",
        diameter_km: 49_244,
        orbital_period: "165 Earth years",
        rotation_period: "16 hours 6 minutes",
        average_temperature: "-200°C",
        moons: 14,
        rings: true,
        description: "The windiest planet, with the strongest winds in the solar system",
        facts: &[
            "Has the strongest winds in the solar system (up to 2,100 km/h)",
            "Was discovered through mathematical predictions",
            "Named after the Roman god of the sea",
        ],
    },
];

struct ConstellationFacts {
    name: &'static str,
    latin_name: &'static str,
    best_season: &'static str,
    description: &'static str,
    notable_stars: &'static [&'static str],
    mythology: &'static str,
}

/// Prominent northern-sky constellations by best viewing season.
const CONSTELLATIONS: &[ConstellationFacts] = &[
    ConstellationFacts {
        name: "Orion",
        latin_name: "Orion",
        best_season: "winter",
        description: "The Hunter, one of the most recognizable constellations",
        notable_stars: &["Betelgeuse", "Rigel", "Bellatrix"],
        mythology: "Named after a hunter in Greek mythology",
    },
    ConstellationFacts {
        name: "Taurus",
        latin_name: "Taurus",
        best_season: "winter",
        description: "The Bull, containing the Pleiades star cluster",
        notable_stars: &["Aldebaran", "Elnath", "Alcyone"],
        mythology: "Represents Zeus transformed into a bull in Greek mythology",
    },
    ConstellationFacts {
        name: "Leo",
        latin_name: "Leo",
        best_season: "spring",
        description: "A distinctive constellation representing a lion",
        notable_stars: &["Regulus", "Denebola", "Algieba"],
        mythology: "Represents the Nemean Lion slain by Hercules",
    },
    ConstellationFacts {
        name: "Ursa Major",
        latin_name: "Ursa Major",
        best_season: "spring",
        description: "The Great Bear, containing the Big Dipper asterism",
        notable_stars: &["Dubhe", "Merak", "Alkaid"],
        mythology: "Represents Callisto, transformed into a bear by Hera",
    },
    ConstellationFacts {
        name: "Lyra",
        latin_name: "Lyra",
        best_season: "summer",
        description: "A small but distinctive constellation representing a harp",
        notable_stars: &["Vega", "Sheliak", "Sulafat"],
        mythology: "Represents the lyre of Orpheus in Greek mythology",
    },
    ConstellationFacts {
        name: "Cygnus",
        latin_name: "Cygnus",
        best_season: "summer",
        description: "The Swan, flying along the Milky Way",
        notable_stars: &["Deneb", "Albireo", "Sadr"],
        mythology: "Associated with several swans of Greek mythology",
    },
    ConstellationFacts {
        name: "Pegasus",
        latin_name: "Pegasus",
        best_season: "autumn",
        description: "Features the Great Square of Pegasus asterism",
        notable_stars: &["Markab", "Scheat", "Algenib"],
        mythology: "Named after the winged horse in Greek mythology",
    },
    ConstellationFacts {
        name: "Cassiopeia",
        latin_name: "Cassiopeia",
        best_season: "autumn",
        description: "The Queen, a distinctive W-shaped constellation",
        notable_stars: &["Schedar", "Caph", "Gamma Cassiopeiae"],
        mythology: "Named after a vain queen in Greek mythology",
    },
];

/// Astronomy tool over a curated local dataset, no network calls.
pub struct Astronomy;

impl Astronomy {
    /// Create a new astronomy tool.
    pub fn new() -> Self {
        Self
    }

    fn get_planet_info(planet: &str) -> Result<Value, ToolError> {
        let wanted = planet.trim().to_lowercase();
        let facts = PLANETS
            .iter()
            .find(|p| p.name.to_lowercase() == wanted)
            .ok_or_else(|| ToolError::InvalidParameter {
                name: "planet".to_string(),
                reason: format!(
                    "unknown planet '{}'; expected one of {}",
                    planet,
                    PLANETS
                        .iter()
                        .map(|p| p.name)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })?;

        Ok(json!({
            "name": facts.name,
            "type": facts.kind,
            "diameter_km": facts.diameter_km,
            "orbital_period": facts.orbital_period,
            "rotation_period": facts.rotation_period,
            "average_temperature": facts.average_temperature,
            "moons": facts.moons,
            "rings": facts.rings,
            "description": facts.description,
            "interesting_facts": facts.facts,
        }))
    }

    fn get_visible_constellations(date: Option<&str>) -> Result<Value, ToolError> {
        let day = match date {
            Some(text) => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").map_err(|_| {
                ToolError::InvalidParameter {
                    name: "date".to_string(),
                    reason: "expected YYYY-MM-DD".to_string(),
                }
            })?,
            None => Utc::now().date_naive(),
        };
        let season = season_for_month(day.month());

        let visible: Vec<Value> = CONSTELLATIONS
            .iter()
            .filter(|c| c.best_season == season)
            .map(|c| {
                json!({
                    "name": c.name,
                    "latin_name": c.latin_name,
                    "description": c.description,
                    "notable_stars": c.notable_stars,
                    "mythology": c.mythology,
                })
            })
            .collect();

        Ok(json!({
            "date": day.format("%Y-%m-%d").to_string(),
            "season": season,
            "hemisphere": "northern",
            "constellations": visible,
        }))
    }
}

/// Northern-hemisphere season for a calendar month.
fn season_for_month(month: u32) -> &'static str {
    match month {
        3..=5 => "spring",
        6..=8 => "summer",
        9..=11 => "autumn",
        _ => "winter",
    }
}

impl Default for Astronomy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for Astronomy {
    fn name(&self) -> &str {
        "astronomy"
    }

    fn description(&self) -> &str {
        "Provides planet facts and seasonal constellation visibility."
    }

    fn functions(&self) -> &'static [FunctionSpec] {
        FUNCTIONS
    }

    async fn call(&self, function: &str, args: ToolArgs) -> Result<Value, ToolError> {
        match function {
            "get_planet_info" => {
                let planet = args.get_string("planet")?;
                Self::get_planet_info(&planet)
            }
            "get_visible_constellations" => {
                let date = args.get_string_opt("date");
                Self::get_visible_constellations(date.as_deref())
            }
            other => Err(unknown_function(self.name(), other)),
        }
    }
}
