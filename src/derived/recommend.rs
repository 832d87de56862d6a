//! Job recommendations for a job seeker.
//!
//! Keyword based and deterministic. A job scores up to 100 points:
//! - skills: 50, share of the job's requirements covered by the profile skills
//! - location: 20, remote jobs and matching locations
//! - experience: 15, the profile's bucket against the job's level
//! - recency: 15, decaying linearly over [`RECENCY_WINDOW_DAYS`]

use std::collections::BTreeSet;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::models::{ExperienceLevel, Job, JobSeekerProfile, JobType};

pub const SKILLS_WEIGHT: f32 = 50.0;
pub const LOCATION_WEIGHT: f32 = 20.0;
pub const EXPERIENCE_WEIGHT: f32 = 15.0;
pub const RECENCY_WEIGHT: f32 = 15.0;

pub const RECENCY_WINDOW_DAYS: f32 = 30.0;

/// Credit for a skill that only appears inside a longer requirement.
const PARTIAL_SKILL_CREDIT: f32 = 0.6;

static TOKEN: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| Regex::new(r"[a-z0-9][a-z0-9+#.]*"));

/// Lowercase words; keeps `c++`, `c#` and `node.js` intact.
fn tokens(text: &str) -> BTreeSet<String> {
    let lower = text.to_lowercase();
    match TOKEN.as_ref() {
        Ok(re) => re
            .find_iter(&lower)
            .map(|m| m.as_str().trim_end_matches('.').to_string())
            .collect(),
        Err(_) => lower.split_whitespace().map(str::to_string).collect(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchScore {
    /// Rounded weighted sum, at most 100.
    pub total: u32,
    pub skills: f32,
    pub location: f32,
    pub experience: f32,
    pub recency: f32,
    /// Profile skills the job asks for, as written in the profile.
    pub matched_skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation<'a> {
    pub job: &'a Job,
    pub score: MatchScore,
}

/// Score how well `job` fits `profile` at time `now`.
pub fn match_score(profile: &JobSeekerProfile, job: &Job, now: DateTime<Utc>) -> MatchScore {
    let (skill_fraction, matched_skills) = skill_overlap(profile, job);
    let skills = SKILLS_WEIGHT * skill_fraction;
    let location = LOCATION_WEIGHT * location_fit(profile.location.as_deref(), job);
    let experience = EXPERIENCE_WEIGHT * experience_fit(profile, job.experience_level);
    let recency = RECENCY_WEIGHT * recency_fit(job.created_at, now);

    let total = (skills + location + experience + recency).round().clamp(0.0, 100.0) as u32;

    MatchScore { total, skills, location, experience, recency, matched_skills }
}

/// Open jobs ranked by descending score; ties keep listing order.
pub fn recommend_jobs<'a>(
    profile: &JobSeekerProfile,
    jobs: &'a [Job],
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<Recommendation<'a>> {
    let mut ranked: Vec<Recommendation<'a>> = jobs
        .iter()
        .filter(|job| job.is_open())
        .map(|job| Recommendation { job, score: match_score(profile, job, now) })
        .collect();

    ranked.sort_by(|a, b| b.score.total.cmp(&a.score.total));
    ranked.truncate(limit);
    ranked
}

fn skill_overlap(profile: &JobSeekerProfile, job: &Job) -> (f32, Vec<String>) {
    let skills: Vec<(&str, String)> = profile
        .skills
        .iter()
        .map(|s| (s.as_str(), s.trim().to_lowercase()))
        .filter(|(_, lower)| !lower.is_empty())
        .collect();
    if skills.is_empty() {
        return (0.0, Vec::new());
    }

    let text_tokens = tokens(&format!("{} {}", job.title, job.description));
    let mut matched = Vec::new();

    if job.requirements.is_empty() {
        // nothing explicit to cover; measure how much of the profile the text mentions
        for (original, lower) in &skills {
            if text_tokens.contains(lower) {
                matched.push(original.to_string());
            }
        }
        return (matched.len() as f32 / skills.len() as f32, matched);
    }

    let mut covered = 0.0_f32;
    for requirement in &job.requirements {
        let requirement_lower = requirement.trim().to_lowercase();
        let requirement_tokens = tokens(&requirement_lower);

        let exact = skills
            .iter()
            .find(|(_, lower)| *lower == requirement_lower || requirement_tokens.contains(lower));
        // "postgres" against "postgresql experience"
        let partial = !requirement_lower.is_empty()
            && skills.iter().any(|(_, lower)| {
                requirement_lower.contains(lower.as_str()) || lower.contains(requirement_lower.as_str())
            });

        if let Some((original, _)) = exact {
            covered += 1.0;
            if !matched.iter().any(|m| m == original) {
                matched.push(original.to_string());
            }
        } else if partial {
            covered += PARTIAL_SKILL_CREDIT;
        }
    }

    ((covered / job.requirements.len() as f32).min(1.0), matched)
}

fn location_fit(preferred: Option<&str>, job: &Job) -> f32 {
    let job_location = job.location.trim().to_lowercase();
    if job.job_type == JobType::Remote || job_location.contains("remote") {
        return 1.0;
    }
    let Some(preferred) = preferred.map(|p| p.trim().to_lowercase()).filter(|p| !p.is_empty()) else {
        return 0.0;
    };

    if job_location.contains(&preferred) || preferred.contains(&job_location) {
        1.0
    } else if tokens(&preferred).iter().any(|t| tokens(&job_location).contains(t)) {
        0.5
    } else {
        0.0
    }
}

fn level_rank(level: ExperienceLevel) -> i32 {
    match level {
        ExperienceLevel::Entry => 0,
        ExperienceLevel::Mid => 1,
        ExperienceLevel::Senior => 2,
    }
}

fn experience_fit(profile: &JobSeekerProfile, wanted: Option<ExperienceLevel>) -> f32 {
    let Some(wanted) = wanted else {
        return 1.0;
    };
    let have = ExperienceLevel::from_years(profile.total_experience_years());

    match level_rank(have) - level_rank(wanted) {
        0 => 1.0,
        // overqualified by one bucket still fits reasonably
        1 => 0.7,
        -1 => 0.4,
        _ => 0.0,
    }
}

fn recency_fit(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f32 {
    let Some(created_at) = created_at else {
        return 0.0;
    };
    let age_days = (now - created_at).num_hours() as f32 / 24.0;
    (1.0 - age_days.max(0.0) / RECENCY_WINDOW_DAYS).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobStatus, WorkExperience};
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn job(id: &str, requirements: &[&str], location: &str, age_days: i64) -> Job {
        Job {
            id: id.into(),
            title: "Backend Engineer".into(),
            description: "Work on services written in Rust and Go".into(),
            requirements: requirements.iter().map(|r| r.to_string()).collect(),
            company: None,
            location: location.into(),
            salary_range: None,
            job_type: JobType::FullTime,
            experience_level: Some(ExperienceLevel::Mid),
            application_deadline: None,
            status: JobStatus::Open,
            application_count: 0,
            recruiter: None,
            created_at: Some(now() - Duration::days(age_days)),
            updated_at: None,
        }
    }

    fn profile(skills: &[&str], location: &str, years: f32) -> JobSeekerProfile {
        JobSeekerProfile {
            skills: skills.iter().map(|s| s.to_string()).collect(),
            experience: vec![WorkExperience { title: "Dev".into(), company: "X".into(), years }],
            location: Some(location.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_tokens_keep_symbols() {
        let t = tokens("C++, C# and Node.js.");
        assert!(t.contains("c++"));
        assert!(t.contains("c#"));
        assert!(t.contains("node.js"));
    }

    #[test]
    fn test_perfect_match_scores_100() {
        let p = profile(&["Rust", "SQL"], "Berlin", 3.0);
        let j = job("J1", &["rust", "sql"], "Berlin, Germany", 0);

        let score = match_score(&p, &j, now());

        assert_eq!(score.total, 100);
        assert_eq!(score.matched_skills, vec!["Rust", "SQL"]);
    }

    #[test]
    fn test_partial_skills_and_stale_job() {
        let p = profile(&["Rust"], "Paris", 3.0);
        let j = job("J1", &["Rust", "Kubernetes"], "Berlin", 60);

        let score = match_score(&p, &j, now());

        assert_eq!(score.skills, 25.0);
        assert_eq!(score.location, 0.0);
        assert_eq!(score.recency, 0.0);
        assert_eq!(score.total, 40);
    }

    #[test]
    fn test_remote_job_fits_any_location() {
        let p = profile(&[], "Lisbon", 0.5);
        let j = job("J1", &[], "Remote", 0);
        assert_eq!(match_score(&p, &j, now()).location, LOCATION_WEIGHT);
    }

    #[test]
    fn test_experience_buckets() {
        let junior = profile(&[], "X", 1.0);
        let senior = profile(&[], "X", 8.0);
        let j = job("J1", &[], "Y", 0);

        assert!(match_score(&senior, &j, now()).experience > match_score(&junior, &j, now()).experience);
    }

    #[test]
    fn test_recommend_skips_closed_and_sorts() {
        let p = profile(&["Rust"], "Berlin", 3.0);
        let mut closed = job("J0", &["Rust"], "Berlin", 0);
        closed.status = JobStatus::Closed;
        let jobs = vec![closed, job("J1", &["Java"], "Tokyo", 20), job("J2", &["Rust"], "Berlin", 1)];

        let ranked = recommend_jobs(&p, &jobs, now(), 10);

        let ids: Vec<&str> = ranked.iter().map(|r| r.job.id.as_str()).collect();
        assert_eq!(ids, vec!["J2", "J1"]);
    }

    #[test]
    fn test_recommend_limit() {
        let p = profile(&["Rust"], "Berlin", 3.0);
        let jobs: Vec<Job> = (0..5).map(|i| job(&format!("J{i}"), &["Rust"], "Berlin", i)).collect();
        assert_eq!(recommend_jobs(&p, &jobs, now(), 2).len(), 2);
    }

    proptest! {
        #[test]
        fn prop_score_is_bounded(
            skills in proptest::collection::vec("[a-z]{1,8}", 0..6),
            requirements in proptest::collection::vec("[a-z]{1,8}", 0..6),
            years in 0.0f32..30.0,
            age in -5i64..400,
        ) {
            let p = JobSeekerProfile {
                skills,
                experience: vec![WorkExperience { title: "t".into(), company: "c".into(), years }],
                ..Default::default()
            };
            let mut j = job("J1", &[], "Somewhere", age);
            j.requirements = requirements;

            let score = match_score(&p, &j, now());

            prop_assert!(score.total <= 100);
            prop_assert!(score.skills <= SKILLS_WEIGHT);
            prop_assert!(score.recency <= RECENCY_WEIGHT);
        }
    }
}
