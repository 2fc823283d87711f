use std::collections::BTreeSet;
use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ModelConfig;
use crate::dataset::HistoricalDataset;
use crate::markets::Market;
use crate::match_record::{Fixture, MatchRecord, Perspective};
use crate::odds::{ImpliedProbabilities, MarketEdge, market_edge};
use crate::rankings::{RankingRow, rank_market};
use crate::scoreline::{self, FixtureProbabilityBundle};
use crate::streaks::{self, FixtureTip, FormAlert};
use crate::team_form::{
    FormConfig, FormRecord, TeamFormSnapshot, aggregate_team_form, season_record, team_matches,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// No historical sheet for the fixture's competition.
    UnknownCompetition,
    /// One side has fewer qualifying matches than the configured minimum.
    ThinSample { team: String, matches: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnknownCompetition => f.write_str("no history for competition"),
            SkipReason::ThinSample { team, matches } => {
                write!(f, "{team} has only {matches} matches")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedFixture {
    pub fixture: Fixture,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureAnalysis {
    pub fixture: Fixture,
    pub home_form: TeamFormSnapshot,
    pub away_form: TeamFormSnapshot,
    pub bundle: FixtureProbabilityBundle,
    pub implied: ImpliedProbabilities,
    pub edge: MarketEdge,
    pub tips: Vec<FixtureTip>,
    pub home_alerts: Vec<FormAlert>,
    pub away_alerts: Vec<FormAlert>,
    pub home_record: Option<FormRecord>,
    pub away_record: Option<FormRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlateReport {
    /// In fixture order.
    pub analyses: Vec<FixtureAnalysis>,
    pub skipped: Vec<SkippedFixture>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionRanking {
    pub competition: String,
    pub market: Market,
    pub rows: Vec<RankingRow>,
}

/// Form for one side of a fixture. With venue-specific form the venue sample
/// is tried first and pooled form is the fallback.
pub fn side_form(
    history: &[MatchRecord],
    team: &str,
    venue: Perspective,
    venue_specific: bool,
    cfg: &FormConfig,
) -> Option<TeamFormSnapshot> {
    if venue_specific
        && venue != Perspective::Either
        && let Some(snapshot) = aggregate_team_form(history, team, venue, cfg)
    {
        return Some(snapshot);
    }
    aggregate_team_form(history, team, Perspective::Either, cfg)
}

pub fn analyze_fixture(
    dataset: &HistoricalDataset,
    fixture: &Fixture,
    cfg: &ModelConfig,
) -> Result<FixtureAnalysis, SkipReason> {
    let history = dataset
        .competition(&fixture.competition)
        .ok_or(SkipReason::UnknownCompetition)?;
    let form_cfg = cfg.form_config();

    let thin = |team: &str| SkipReason::ThinSample {
        team: team.to_string(),
        matches: team_matches(history, team, Perspective::Either).len(),
    };
    let venue = cfg.venue_specific;
    let home_form = side_form(history, &fixture.home_team, Perspective::Home, venue, &form_cfg)
        .ok_or_else(|| thin(&fixture.home_team))?;
    let away_form = side_form(history, &fixture.away_team, Perspective::Away, venue, &form_cfg)
        .ok_or_else(|| thin(&fixture.away_team))?;

    let bundle = scoreline::estimate(&home_form, &away_form, &fixture.competition);
    let mut tips = streaks::shared_streak_tips(
        history,
        &fixture.home_team,
        &fixture.away_team,
        cfg.streak_window,
    );
    tips.extend(streaks::model_tips(&bundle, cfg.tip_threshold));

    Ok(FixtureAnalysis {
        implied: ImpliedProbabilities::from_odds(&fixture.odds),
        edge: market_edge(&bundle, &fixture.odds),
        tips,
        home_alerts: streaks::form_alerts(history, &fixture.home_team),
        away_alerts: streaks::form_alerts(history, &fixture.away_team),
        home_record: season_record(history, &fixture.home_team),
        away_record: season_record(history, &fixture.away_team),
        fixture: fixture.clone(),
        home_form,
        away_form,
        bundle,
    })
}

/// Evaluates every fixture in parallel. Fixtures that cannot be modelled are
/// listed in `skipped`, never treated as errors.
pub fn analyze_fixtures(
    dataset: &HistoricalDataset,
    fixtures: &[Fixture],
    cfg: &ModelConfig,
) -> SlateReport {
    let results: Vec<Result<FixtureAnalysis, SkippedFixture>> = fixtures
        .par_iter()
        .map(|fixture| {
            analyze_fixture(dataset, fixture, cfg).map_err(|reason| SkippedFixture {
                fixture: fixture.clone(),
                reason,
            })
        })
        .collect();

    let mut report = SlateReport::default();
    for result in results {
        match result {
            Ok(analysis) => report.analyses.push(analysis),
            Err(skipped) => {
                debug!(
                    competition = %skipped.fixture.competition,
                    home = %skipped.fixture.home_team,
                    away = %skipped.fixture.away_team,
                    reason = %skipped.reason,
                    "fixture skipped"
                );
                report.skipped.push(skipped);
            }
        }
    }
    report
}

/// Competitions that appear in the fixture list and have history, sorted.
pub fn slate_competitions(dataset: &HistoricalDataset, fixtures: &[Fixture]) -> Vec<String> {
    fixtures
        .iter()
        .map(|f| f.competition.as_str())
        .filter(|code| dataset.has_competition(code))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

pub fn competition_rankings(
    dataset: &HistoricalDataset,
    fixtures: &[Fixture],
    market: Market,
    cfg: &ModelConfig,
) -> Vec<CompetitionRanking> {
    let ranking_cfg = cfg.ranking_config();
    slate_competitions(dataset, fixtures)
        .into_par_iter()
        .filter_map(|competition| {
            let history = dataset.competition(&competition)?;
            let rows = rank_market(history, market, &ranking_cfg);
            Some(CompetitionRanking {
                competition,
                market,
                rows,
            })
        })
        .collect()
}
