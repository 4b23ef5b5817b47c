use jiff::{Span, civil::Date};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    entities::{actor, country, genre, language, movie},
    error::{AppError, AppResult},
};

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_COUNTRY_CODE_LEN: usize = 3;
pub const MAX_FUTURE_DAYS: i64 = 365;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum MovieStatus {
    Released,
    #[serde(rename = "In Production")]
    InProduction,
    #[serde(rename = "Post Production")]
    PostProduction,
}

impl MovieStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MovieStatus::Released => "Released",
            MovieStatus::InProduction => "In Production",
            MovieStatus::PostProduction => "Post Production",
        }
    }

    /// Lenient parse used for stored values and seed files.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "released" => Some(MovieStatus::Released),
            "in production" => Some(MovieStatus::InProduction),
            "post production" => Some(MovieStatus::PostProduction),
            _ => None,
        }
    }
}

/// Wrapper for optional fields that can be explicitly cleared.
/// - `Unchanged`: field absent from the request, keep the stored value
/// - `Clear`: field sent as `null`
/// - `Set(T)`: field sent with a value
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Clearable<T> {
    #[default]
    Unchanged,
    Clear,
    Set(T),
}

impl<T> Clearable<T> {
    pub fn resolve(self, existing: Option<T>) -> Option<T> {
        match self {
            Clearable::Unchanged => existing,
            Clearable::Clear => None,
            Clearable::Set(v) => Some(v),
        }
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Clearable::Set(v) => Some(v),
            _ => None,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Clearable<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt = Option::<T>::deserialize(deserializer)?;
        Ok(match opt {
            Some(v) => Clearable::Set(v),
            None => Clearable::Clear,
        })
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct MovieCreate {
    pub name: String,
    #[serde(alias = "date")]
    pub release_date: Date,
    pub status: MovieStatus,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub actors: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
}

impl MovieCreate {
    pub fn validate(&self, today: Date) -> AppResult<()> {
        validate_name(&self.name)?;
        validate_release_date(self.release_date, today)?;
        validate_score(self.score)?;
        validate_amount("budget", self.budget)?;
        validate_amount("revenue", self.revenue)?;
        validate_country(self.country.as_deref())
    }
}

/// Partial update. Absent fields keep their stored value; `null` on a
/// required field or a relation list counts as absent.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MovieUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "date")]
    pub release_date: Option<Date>,
    #[serde(default)]
    pub status: Option<MovieStatus>,
    #[serde(default)]
    pub score: Clearable<f64>,
    #[serde(default)]
    pub overview: Clearable<String>,
    #[serde(default)]
    pub budget: Clearable<f64>,
    #[serde(default)]
    pub revenue: Clearable<f64>,
    #[serde(default)]
    pub country: Clearable<String>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    #[serde(default)]
    pub actors: Option<Vec<String>>,
    #[serde(default)]
    pub languages: Option<Vec<String>>,
}

impl MovieUpdate {
    pub fn validate(&self, today: Date) -> AppResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(date) = self.release_date {
            validate_release_date(date, today)?;
        }
        validate_score(self.score.as_set().copied())?;
        validate_amount("budget", self.budget.as_set().copied())?;
        validate_amount("revenue", self.revenue.as_set().copied())?;
        validate_country(self.country.as_set().map(String::as_str))
    }
}

fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::invalid_input("Movie name must not be empty."));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::invalid_input(format!(
            "Movie name must be at most {MAX_NAME_LEN} characters."
        )));
    }
    Ok(())
}

fn validate_release_date(date: Date, today: Date) -> AppResult<()> {
    let limit = today.saturating_add(Span::new().days(MAX_FUTURE_DAYS));
    if date > limit {
        return Err(AppError::invalid_input(
            "Release date cannot be more than 1 year in the future.",
        ));
    }
    Ok(())
}

fn validate_score(score: Option<f64>) -> AppResult<()> {
    match score {
        Some(s) if !(0.0..=100.0).contains(&s) => {
            Err(AppError::invalid_input("Score must be between 0 and 100."))
        },
        _ => Ok(()),
    }
}

fn validate_amount(field: &str, value: Option<f64>) -> AppResult<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => {
            Err(AppError::invalid_input(format!("{field} must be non-negative.")))
        },
        _ => Ok(()),
    }
}

fn validate_country(code: Option<&str>) -> AppResult<()> {
    match code.map(str::trim) {
        Some("") => Err(AppError::invalid_input("Country code must not be blank.")),
        Some(code) if code.chars().count() > MAX_COUNTRY_CODE_LEN => {
            Err(AppError::invalid_input(format!(
                "Country code must be at most {MAX_COUNTRY_CODE_LEN} characters."
            )))
        },
        _ => Ok(()),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MovieSummary {
    pub id: i32,
    pub name: String,
    pub date: Date,
    pub score: Option<f64>,
    pub overview: Option<String>,
}

impl MovieSummary {
    pub fn from_model(model: movie::Model) -> AppResult<Self> {
        Ok(Self {
            id: model.id,
            name: model.name,
            date: model.date.parse()?,
            score: model.score,
            overview: model.overview,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MovieDetail {
    pub id: i32,
    pub name: String,
    pub date: Date,
    pub score: Option<f64>,
    pub overview: Option<String>,
    pub status: MovieStatus,
    pub budget: Option<f64>,
    pub revenue: Option<f64>,
    pub country: Option<country::Model>,
    pub genres: Vec<genre::Model>,
    pub actors: Vec<actor::Model>,
    pub languages: Vec<language::Model>,
}

impl MovieDetail {
    pub fn assemble(
        model: movie::Model,
        country: Option<country::Model>,
        genres: Vec<genre::Model>,
        actors: Vec<actor::Model>,
        languages: Vec<language::Model>,
    ) -> AppResult<Self> {
        let status = MovieStatus::parse(&model.status).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "movie {} has unknown status {:?}",
                model.id,
                model.status
            ))
        })?;

        Ok(Self {
            id: model.id,
            name: model.name,
            date: model.date.parse()?,
            score: model.score,
            overview: model.overview,
            status,
            budget: model.budget,
            revenue: model.revenue,
            country,
            genres,
            actors,
            languages,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MovieListResponse {
    pub movies: Vec<MovieSummary>,
    pub prev_page: Option<String>,
    pub next_page: Option<String>,
    pub total_pages: u64,
    pub total_items: u64,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    crate::pagination::DEFAULT_PER_PAGE
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    fn create_input() -> MovieCreate {
        MovieCreate {
            name: "Heat".to_string(),
            release_date: date(1995, 12, 15),
            status: MovieStatus::Released,
            score: Some(82.0),
            overview: None,
            budget: Some(60_000_000.0),
            revenue: Some(187_436_818.0),
            country: Some("US".to_string()),
            genres: vec!["Crime".to_string()],
            actors: vec![],
            languages: vec![],
        }
    }

    #[test]
    fn release_date_limit_is_one_year_out() {
        let today = date(2024, 1, 1);
        let mut input = create_input();

        input.release_date = date(2024, 12, 31);
        assert!(input.validate(today).is_ok());

        input.release_date = date(2025, 1, 1);
        assert!(matches!(input.validate(today), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn bounds_are_enforced_on_create() {
        let today = date(2024, 1, 1);

        let mut input = create_input();
        input.score = Some(100.5);
        assert!(matches!(input.validate(today), Err(AppError::InvalidInput(_))));

        let mut input = create_input();
        input.budget = Some(-1.0);
        assert!(matches!(input.validate(today), Err(AppError::InvalidInput(_))));

        let mut input = create_input();
        input.revenue = Some(-0.01);
        assert!(matches!(input.validate(today), Err(AppError::InvalidInput(_))));

        let mut input = create_input();
        input.country = Some("USAX".to_string());
        assert!(matches!(input.validate(today), Err(AppError::InvalidInput(_))));

        let mut input = create_input();
        input.name = "   ".to_string();
        assert!(matches!(input.validate(today), Err(AppError::InvalidInput(_))));

        let mut input = create_input();
        input.name = "x".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(input.validate(today), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn update_only_checks_present_fields() {
        let today = date(2024, 1, 1);
        assert!(MovieUpdate::default().validate(today).is_ok());

        let patch = MovieUpdate { score: Clearable::Set(150.0), ..Default::default() };
        assert!(matches!(patch.validate(today), Err(AppError::InvalidInput(_))));

        let patch = MovieUpdate { score: Clearable::Clear, ..Default::default() };
        assert!(patch.validate(today).is_ok());
    }

    #[test]
    fn blank_country_code_is_rejected() {
        let today = date(2024, 1, 1);

        let mut input = create_input();
        input.country = Some("   ".to_string());
        assert!(matches!(input.validate(today), Err(AppError::InvalidInput(_))));

        let patch: MovieUpdate = serde_json::from_str(r#"{"country": "   "}"#).unwrap();
        assert!(matches!(patch.validate(today), Err(AppError::InvalidInput(_))));

        let patch: MovieUpdate = serde_json::from_str(r#"{"country": null}"#).unwrap();
        assert!(patch.validate(today).is_ok());
    }

    #[test]
    fn patch_distinguishes_null_from_absent() {
        let patch: MovieUpdate =
            serde_json::from_str(r#"{"score": null, "overview": "New cut"}"#).unwrap();
        assert_eq!(patch.score, Clearable::Clear);
        assert_eq!(patch.overview, Clearable::Set("New cut".to_string()));
        assert_eq!(patch.budget, Clearable::Unchanged);
        assert!(patch.genres.is_none());

        assert_eq!(Clearable::<f64>::Unchanged.resolve(Some(1.0)), Some(1.0));
        assert_eq!(Clearable::<f64>::Clear.resolve(Some(1.0)), None);
    }

    #[test]
    fn create_accepts_date_alias_and_defaults_relations() {
        let input: MovieCreate = serde_json::from_str(
            r#"{"name": "Alien", "date": "1979-05-25", "status": "Post Production"}"#,
        )
        .unwrap();
        assert_eq!(input.release_date, date(1979, 5, 25));
        assert_eq!(input.status, MovieStatus::PostProduction);
        assert!(input.genres.is_empty() && input.country.is_none());
    }

    #[test]
    fn status_strings() {
        assert_eq!(MovieStatus::parse(" released "), Some(MovieStatus::Released));
        assert_eq!(MovieStatus::parse("Post PRODUCTION"), Some(MovieStatus::PostProduction));
        assert_eq!(MovieStatus::parse("Cancelled"), None);
        assert_eq!(
            serde_json::to_value(MovieStatus::InProduction).unwrap(),
            serde_json::json!("In Production")
        );
    }
}
