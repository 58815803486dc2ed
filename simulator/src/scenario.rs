//! Scripted arrival scenarios.

use serde::{Deserialize, Serialize};

use ropesim_coordinator::Direction;

/// A scripted simulation scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Arrivals in order.
    pub arrivals: Vec<ScriptedArrival>,
}

/// One scripted actor arrival.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedArrival {
    /// Delay before this arrival, relative to the previous one.
    pub delay_ms: u64,
    /// Fixed direction, or `None` for a random draw.
    pub direction: Option<Direction>,
}

impl ScriptedArrival {
    fn east(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            direction: Some(Direction::East),
        }
    }

    fn west(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            direction: Some(Direction::West),
        }
    }
}

impl Scenario {
    /// Load a scenario: a builtin by name, or a `.json` file by path.
    pub fn load(name: &str) -> anyhow::Result<Self> {
        if name.ends_with(".json") {
            return Self::from_file(name);
        }

        match name {
            "alternating" => Ok(Self::alternating()),
            "east-burst" => Ok(Self::east_burst()),
            "westbound-starvation" => Ok(Self::westbound_starvation()),
            _ => Err(anyhow::anyhow!("Unknown scenario: {}", name)),
        }
    }

    /// Load a scenario from a JSON file.
    fn from_file(path: &str) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Strictly alternating directions, exercising rope handovers.
    fn alternating() -> Self {
        let arrivals = (0..20)
            .map(|i| {
                if i % 2 == 0 {
                    ScriptedArrival::east(200)
                } else {
                    ScriptedArrival::west(200)
                }
            })
            .collect();

        Self {
            name: "alternating".to_string(),
            description: "Directions alternate every arrival; every crossing hands the rope over".to_string(),
            arrivals,
        }
    }

    /// An eastbound platoon followed by westbound stragglers.
    fn east_burst() -> Self {
        let mut arrivals: Vec<ScriptedArrival> =
            (0..12).map(|_| ScriptedArrival::east(100)).collect();
        arrivals.extend((0..3).map(|_| ScriptedArrival::west(500)));

        Self {
            name: "east-burst".to_string(),
            description: "A dense eastbound platoon piles up on the rope before westbound traffic arrives".to_string(),
            arrivals,
        }
    }

    /// A continuous eastbound stream that overlaps the crossing duration,
    /// with two early westbound arrivals that sit waiting. Demonstrates the
    /// weak-fairness behavior: the waiters are only admitted once the
    /// eastbound stream drains.
    fn westbound_starvation() -> Self {
        let mut arrivals = vec![ScriptedArrival::east(0), ScriptedArrival::west(300)];
        arrivals.extend((0..14).map(|_| ScriptedArrival::east(300)));
        arrivals.push(ScriptedArrival::west(100));

        Self {
            name: "westbound-starvation".to_string(),
            description: "Eastbound arrivals outpace the crossing time, stalling westbound waiters until the stream ends".to_string(),
            arrivals,
        }
    }
}
