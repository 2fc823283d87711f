//! Seeded synthetic competitions for demos, benches and tests.

use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::match_record::{Fixture, MarketOdds, MatchRecord, MatchResult, SideLine};

const BASE_GOALS: f64 = 1.35;
const HOME_EDGE: f64 = 1.15;
const FIRST_HALF_SHARE: f64 = 0.45;

#[derive(Debug, Clone)]
pub struct SyntheticLeague {
    pub code: String,
    pub teams: Vec<String>,
    pub history: Vec<MatchRecord>,
    pub fixtures: Vec<Fixture>,
}

#[derive(Debug, Clone, Copy)]
struct Strength {
    attack: f64,
    defence: f64,
    discipline: f64,
}

/// A double round robin of `teams` clubs played a week apart from `start`,
/// plus one more round of unplayed fixtures with rough odds. Same seed, same
/// league.
pub fn generate_league(code: &str, teams: usize, start: NaiveDate, seed: u64) -> SyntheticLeague {
    let mut rng = StdRng::seed_from_u64(seed);
    let teams = teams.max(2);
    let names: Vec<String> = (1..=teams).map(|i| format!("{code} Club {i:02}")).collect();
    let strengths: Vec<Strength> = (0..teams)
        .map(|_| Strength {
            attack: rng.gen_range(0.7..1.4),
            defence: rng.gen_range(0.7..1.4),
            discipline: rng.gen_range(0.8..1.3),
        })
        .collect();

    let first_leg = round_robin(teams);
    let mut history = Vec::new();
    let mut day = 0u64;
    for leg in 0..2 {
        for round in &first_leg {
            let date = start + Days::new(day * 7);
            for &(h, a) in round {
                let (h, a) = if leg == 0 { (h, a) } else { (a, h) };
                let home = (names[h].as_str(), strengths[h]);
                let away = (names[a].as_str(), strengths[a]);
                history.push(play(&mut rng, code, date, home, away));
            }
            day += 1;
        }
    }

    let fixture_date = start + Days::new(day * 7);
    let fixtures = first_leg
        .first()
        .map(|round| {
            round
                .iter()
                .map(|&(h, a)| {
                    let (lh, la) = intensities(strengths[h], strengths[a]);
                    Fixture {
                        competition: code.to_string(),
                        date: Some(fixture_date),
                        home_team: names[h].clone(),
                        away_team: names[a].clone(),
                        odds: rough_odds(lh, la),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    SyntheticLeague {
        code: code.to_string(),
        teams: names,
        history,
        fixtures,
    }
}

/// Circle-method pairings; with an odd count one club rests each round.
fn round_robin(teams: usize) -> Vec<Vec<(usize, usize)>> {
    let slots = teams + teams % 2;
    let mut order: Vec<usize> = (0..slots).collect();
    let mut rounds = Vec::with_capacity(slots - 1);
    for r in 0..slots - 1 {
        let mut pairs = Vec::new();
        for i in 0..slots / 2 {
            let (x, y) = (order[i], order[slots - 1 - i]);
            if x >= teams || y >= teams {
                continue;
            }
            pairs.push(if (r + i) % 2 == 0 { (x, y) } else { (y, x) });
        }
        rounds.push(pairs);
        order[1..].rotate_right(1);
    }
    rounds
}

fn intensities(home: Strength, away: Strength) -> (f64, f64) {
    (
        BASE_GOALS * home.attack / away.defence * HOME_EDGE,
        BASE_GOALS * away.attack / home.defence / HOME_EDGE,
    )
}

fn play(
    rng: &mut StdRng,
    code: &str,
    date: NaiveDate,
    home: (&str, Strength),
    away: (&str, Strength),
) -> MatchRecord {
    let (lh, la) = intensities(home.1, away.1);
    let home_line = side_line(rng, lh, home.1);
    let away_line = side_line(rng, la, away.1);
    MatchRecord {
        competition: code.to_string(),
        date,
        home_team: home.0.to_string(),
        away_team: away.0.to_string(),
        result: MatchResult::from_goals(home_line.goals, away_line.goals),
        home: home_line,
        away: away_line,
    }
}

fn side_line(rng: &mut StdRng, lambda: f64, s: Strength) -> SideLine {
    let goals = sample_poisson(rng, lambda).min(9) as u8;
    let ht_goals = (0..goals).filter(|_| rng.gen_bool(FIRST_HALF_SHARE)).count() as u8;
    let shots = sample_poisson(rng, 8.0 + 3.5 * lambda) as u16;
    let on_target = (0..shots).filter(|_| rng.gen_bool(0.35)).count() as u16;
    SideLine {
        goals,
        ht_goals,
        shots,
        shots_on_target: on_target.max(u16::from(goals)),
        corners: sample_poisson(rng, 3.0 + 1.5 * s.attack) as u16,
        yellow_cards: sample_poisson(rng, 1.7 * s.discipline) as u16,
        red_cards: u16::from(rng.gen_bool(0.04)),
        fouls: sample_poisson(rng, 10.5 * s.discipline) as u16,
    }
}

/// Knuth's product method; fine for the small intensities used here.
fn sample_poisson(rng: &mut StdRng, lambda: f64) -> u32 {
    let limit = (-lambda.max(0.0)).exp();
    let mut k = 0u32;
    let mut p = 1.0;
    loop {
        p *= rng.gen_range(0.0..1.0);
        if p <= limit {
            return k;
        }
        k += 1;
    }
}

fn rough_odds(lh: f64, la: f64) -> MarketOdds {
    let diff = lh - la;
    let p_home = (0.45 + 0.18 * diff).clamp(0.1, 0.8);
    let p_away = (0.28 - 0.15 * diff).clamp(0.08, 0.75);
    let p_draw = (1.0 - p_home - p_away).max(0.12);
    let p_over = (0.25 + 0.12 * (lh + la)).clamp(0.2, 0.8);
    let price = |p: f64| ((1.0 / (p * 1.05)) * 100.0).round() / 100.0;
    MarketOdds {
        home: Some(price(p_home)),
        draw: Some(price(p_draw)),
        away: Some(price(p_away)),
        over_25: Some(price(p_over)),
        under_25: Some(price(1.0 - p_over)),
    }
}
