use std::{io::Read, path::Path};

use anyhow::Context;
use csv::StringRecord;
use jiff::civil::Date;
use tracing::{debug, info, warn};

use crate::{
    error::AppError,
    models::{MovieCreate, MovieStatus},
    service::MovieService,
};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SeedReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// Loads the movies CSV into an empty catalog. A populated catalog is left alone.
pub async fn seed_from_path(movies: &MovieService, path: &Path) -> anyhow::Result<SeedReport> {
    if movies.count().await? > 0 {
        info!(path = %path.display(), "catalog already populated, skipping seed");
        return Ok(SeedReport::default());
    }

    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open seed file {}", path.display()))?;
    seed_from_reader(movies, file).await
}

pub async fn seed_from_reader<R: Read>(
    movies: &MovieService,
    reader: R,
) -> anyhow::Result<SeedReport> {
    let (rows, mut report) = parse_rows(reader)?;
    debug!(rows = rows.len(), "parsed seed rows");

    for (line, row) in rows {
        let name = row.name.clone();
        match movies.create(row).await {
            Ok(_) => report.inserted += 1,
            Err(AppError::Internal(err)) => return Err(err.context(format!("seed line {line}"))),
            Err(err) => {
                warn!(line, name = %name, error = %err, "skipping seed row");
                report.skipped += 1;
            },
        }
    }

    info!(inserted = report.inserted, skipped = report.skipped, "seed finished");
    Ok(report)
}

struct Columns {
    name: usize,
    date: usize,
    status: usize,
    score: Option<usize>,
    genre: Option<usize>,
    overview: Option<usize>,
    crew: Option<usize>,
    language: Option<usize>,
    budget: Option<usize>,
    revenue: Option<usize>,
    country: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> anyhow::Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| find(name).with_context(|| format!("missing column {name}"));

        Ok(Self {
            name: require("names")?,
            date: require("date_x")?,
            status: require("status")?,
            score: find("score"),
            genre: find("genre"),
            overview: find("overview"),
            crew: find("crew"),
            language: find("orig_lang"),
            budget: find("budget_x"),
            revenue: find("revenue"),
            country: find("country"),
        })
    }
}

/// Rows that parse, tagged with their line number. Unparseable rows are
/// counted as skipped.
fn parse_rows<R: Read>(reader: R) -> anyhow::Result<(Vec<(u64, MovieCreate)>, SeedReport)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::from_headers(reader.headers().context("failed to read CSV header")?)?;
    let mut report = SeedReport::default();
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "skipping malformed seed row");
                report.skipped += 1;
                continue;
            },
        };
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        match parse_record(&record, &columns) {
            Ok(row) => rows.push((line, row)),
            Err(reason) => {
                warn!(line, reason = %reason, "skipping seed row");
                report.skipped += 1;
            },
        }
    }

    Ok((rows, report))
}

fn parse_record(record: &StringRecord, columns: &Columns) -> Result<MovieCreate, String> {
    let get = |idx: Option<usize>| idx.and_then(|i| record.get(i)).map(str::trim).unwrap_or("");

    let name = get(Some(columns.name));
    if name.is_empty() {
        return Err("empty name".to_string());
    }

    let raw_date = get(Some(columns.date));
    let release_date =
        parse_date(raw_date).ok_or_else(|| format!("unreadable date {raw_date:?}"))?;

    let raw_status = get(Some(columns.status));
    let status =
        MovieStatus::parse(raw_status).ok_or_else(|| format!("unknown status {raw_status:?}"))?;

    Ok(MovieCreate {
        name: name.to_string(),
        release_date,
        status,
        score: parse_number(get(columns.score))?,
        overview: Some(get(columns.overview)).filter(|s| !s.is_empty()).map(str::to_string),
        budget: parse_number(get(columns.budget))?,
        revenue: parse_number(get(columns.revenue))?,
        country: Some(get(columns.country)).filter(|s| !s.is_empty()).map(str::to_string),
        genres: split_list(get(columns.genre)),
        actors: crew_actors(get(columns.crew)),
        languages: split_list(get(columns.language)),
    })
}

fn parse_date(raw: &str) -> Option<Date> {
    Date::strptime("%m/%d/%Y", raw).ok().or_else(|| raw.parse().ok())
}

fn parse_number(raw: &str) -> Result<Option<f64>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(|_| format!("unreadable number {raw:?}"))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

/// Crew cells alternate `actor, character, actor, character, ...`.
fn crew_actors(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .step_by(2)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
