use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};

use jobboard::api::{FilePart, HttpTransport};
use jobboard::derived::{ApplicationStats, JobFilter, RecruiterDashboard, recommend_jobs};
use jobboard::models::{
    Application, ApplicationDraft, ApplicationStatus, Job, JobDraft, JobQuery, JobSeekerProfileUpdate,
    JobType, LoginRequest, Profile, RecruiterProfileUpdate, Role, SalaryRange, SignupRequest, User,
};
use jobboard::services;
use jobboard::AppContext;

type Ctx = AppContext<HttpTransport>;

#[derive(Parser, Debug)]
#[command(name = "jobboard", about = "Command-line client for the job board API", version)]
pub struct Cli {
    /// Directory holding jobboard.yaml
    #[arg(long, default_value = ".", global = true)]
    pub config_dir: Utf8PathBuf,

    /// Override the configured API base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Log at debug level
    #[arg(long, global = true)]
    pub debug: bool,

    /// Mirror log output to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and remember the session
    Login(LoginArgs),
    /// Create an account and remember the session
    Signup(SignupArgs),
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Browse and manage job postings
    Jobs {
        #[command(subcommand)]
        command: JobsCommand,
    },
    /// Apply to a job
    Apply(ApplyArgs),
    /// Track and decide applications
    Applications {
        #[command(subcommand)]
        command: ApplicationsCommand,
    },
    /// Show or update your profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },
    /// Recruiter verification and user management
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
    /// Rank open jobs against your profile
    Recommend {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "JOBBOARD_PASSWORD")]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct SignupArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "JOBBOARD_PASSWORD")]
    pub password: String,
    /// jobseeker or recruiter
    #[arg(long, default_value = "jobseeker")]
    pub role: Role,
    /// Company, for recruiters
    #[arg(long)]
    pub company: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub job_type: Option<JobType>,
    /// Hide closed postings
    #[arg(long)]
    pub open_only: bool,
}

#[derive(Args, Debug)]
pub struct JobArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: String,
    #[arg(long)]
    pub location: String,
    #[arg(long, default_value = "full-time")]
    pub job_type: JobType,
    /// Repeat for each requirement
    #[arg(long = "requirement")]
    pub requirements: Vec<String>,
    #[arg(long, requires = "salary_max")]
    pub salary_min: Option<u64>,
    #[arg(long, requires = "salary_min")]
    pub salary_max: Option<u64>,
}

impl JobArgs {
    fn into_draft(self) -> JobDraft {
        let salary_range = self
            .salary_min
            .zip(self.salary_max)
            .map(|(min, max)| SalaryRange { min, max, currency: None });

        JobDraft {
            title: self.title,
            description: self.description,
            requirements: self.requirements,
            location: self.location,
            salary_range,
            job_type: self.job_type,
            experience_level: None,
            application_deadline: None,
            status: None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum JobsCommand {
    /// Public listing
    List(ListArgs),
    /// One posting in detail
    Show { id: String },
    /// Your postings (recruiters)
    Mine,
    /// Totals over your postings (recruiters)
    Dashboard,
    Create(JobArgs),
    Update {
        id: String,
        #[command(flatten)]
        job: JobArgs,
    },
    Delete { id: String },
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    pub job_id: String,
    #[arg(long)]
    pub cover_letter: Option<String>,
    /// Resume file to upload
    #[arg(long)]
    pub resume: Option<Utf8PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum ApplicationsCommand {
    /// Your applications (job seekers)
    Mine {
        /// Print per-status totals
        #[arg(long)]
        stats: bool,
    },
    /// Applications received for a posting (recruiters)
    ForJob { job_id: String },
    Accept { id: String },
    Reject { id: String },
    /// Withdraw one of your pending applications
    Withdraw { id: String },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    Show,
    /// Update a job seeker profile
    Seeker {
        /// Replaces the skill list; repeat for each skill
        #[arg(long = "skill")]
        skills: Vec<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        resume: Option<Utf8PathBuf>,
    },
    /// Update a recruiter profile
    Recruiter {
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        position: Option<String>,
        #[arg(long)]
        website: Option<String>,
        /// Verification document to upload; repeatable
        #[arg(long = "document")]
        documents: Vec<Utf8PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// Recruiters awaiting verification
    Pending,
    Approve { id: String },
    Reject { id: String },
    Users,
    DeleteUser { id: String },
}

pub async fn run(ctx: &Ctx, command: Command) -> Result<()> {
    match command {
        Command::Login(args) => {
            let session = services::login(ctx, &LoginRequest { email: args.email, password: args.password }).await?;
            println!("Logged in as {} ({})", session.user.name, session.user.role.as_str());
        }
        Command::Signup(args) => {
            let request = SignupRequest {
                name: args.name,
                email: args.email,
                password: args.password,
                role: args.role,
                company: args.company,
            };
            let session = services::signup(ctx, &request).await?;
            println!("Welcome, {}", session.user.name);
        }
        Command::Logout => {
            services::logout(ctx).await?;
            println!("Logged out");
        }
        Command::Whoami => match ctx.current_user() {
            Some(user) => print_user(&user),
            None => println!("Not logged in"),
        },
        Command::Jobs { command } => run_jobs(ctx, command).await?,
        Command::Apply(args) => {
            // the duplicate-application check reads the cached list
            services::list_my_applications(ctx).await?;
            let resume = match &args.resume {
                Some(path) => Some(FilePart::from_path("resume", path).await?),
                None => None,
            };
            let draft = ApplicationDraft { cover_letter: args.cover_letter };
            let application = services::apply_to_job(ctx, &args.job_id, &draft, resume).await?;
            println!("Applied: {}", application.id);
        }
        Command::Applications { command } => run_applications(ctx, command).await?,
        Command::Profile { command } => run_profile(ctx, command).await?,
        Command::Admin { command } => run_admin(ctx, command).await?,
        Command::Recommend { limit } => {
            let profile = services::fetch_job_seeker_profile(ctx).await?;
            let jobs = services::list_jobs(ctx, &JobQuery::default()).await?;
            let ranked = recommend_jobs(&profile, &jobs, Utc::now(), limit);
            if ranked.is_empty() {
                println!("No open jobs to recommend");
            }
            for recommendation in ranked {
                println!(
                    "{:>3}  {}  [{}]  matched: {}",
                    recommendation.score.total,
                    recommendation.job.title,
                    recommendation.job.id,
                    recommendation.score.matched_skills.join(", ")
                );
            }
        }
    }
    Ok(())
}

/// Pick up an approval granted since the session was stored.
async fn refresh_verification(ctx: &Ctx) {
    let unverified = ctx
        .current_user()
        .is_some_and(|user| user.is_recruiter() && !user.can_manage_postings());
    if unverified {
        if let Err(err) = services::fetch_recruiter_profile(ctx).await {
            tracing::warn!("Could not refresh recruiter verification: {}", err);
        }
    }
}

async fn run_jobs(ctx: &Ctx, command: JobsCommand) -> Result<()> {
    match command {
        JobsCommand::List(args) => {
            let query = JobQuery {
                search: args.search.clone(),
                location: args.location.clone(),
                job_type: args.job_type,
            };
            let jobs = services::list_jobs(ctx, &query).await?;
            let filter = JobFilter {
                query: args.search,
                location: args.location,
                job_type: args.job_type,
                open_only: args.open_only,
            };
            print_jobs(filter.apply(&jobs));
        }
        JobsCommand::Show { id } => {
            let job = services::fetch_job(ctx, &id).await?;
            print_job(&job);
        }
        JobsCommand::Mine => {
            let jobs = services::list_my_jobs(ctx).await?;
            print_jobs(jobs.iter());
        }
        JobsCommand::Dashboard => {
            let jobs = services::list_my_jobs(ctx).await?;
            let dashboard = RecruiterDashboard::from_jobs(&jobs);
            println!("Postings:      {} ({} open, {} closed)", dashboard.total_jobs, dashboard.open_jobs, dashboard.closed_jobs);
            println!("Applications:  {} ({} per posting)", dashboard.total_applications, dashboard.average_applications());
            if let Some(title) = dashboard.most_applied {
                println!("Most applied:  {title}");
            }
        }
        JobsCommand::Create(args) => {
            refresh_verification(ctx).await;
            let job = services::create_job(ctx, &args.into_draft()).await?;
            println!("Created {}", job.id);
        }
        JobsCommand::Update { id, job } => {
            refresh_verification(ctx).await;
            services::list_my_jobs(ctx).await?;
            let job = services::update_job(ctx, &id, &job.into_draft()).await?;
            println!("Updated {}", job.id);
        }
        JobsCommand::Delete { id } => {
            refresh_verification(ctx).await;
            services::list_my_jobs(ctx).await?;
            services::delete_job(ctx, &id).await?;
            println!("Deleted {id}");
        }
    }
    Ok(())
}

async fn run_applications(ctx: &Ctx, command: ApplicationsCommand) -> Result<()> {
    match command {
        ApplicationsCommand::Mine { stats } => {
            let applications = services::list_my_applications(ctx).await?;
            print_applications(&applications);
            if stats {
                print_stats(&ApplicationStats::from_applications(&applications));
            }
        }
        ApplicationsCommand::ForJob { job_id } => {
            let applications = services::list_job_applications(ctx, &job_id).await?;
            print_applications(&applications);
            print_stats(&ApplicationStats::from_applications(&applications));
        }
        ApplicationsCommand::Accept { id } => {
            refresh_verification(ctx).await;
            let application = services::accept_application(ctx, &id).await?;
            println!("{} is now {}", application.id, application.status.as_str());
        }
        ApplicationsCommand::Reject { id } => {
            refresh_verification(ctx).await;
            let application = services::reject_application(ctx, &id).await?;
            println!("{} is now {}", application.id, application.status.as_str());
        }
        ApplicationsCommand::Withdraw { id } => {
            services::list_my_applications(ctx).await?;
            services::withdraw_application(ctx, &id).await?;
            println!("Withdrew {id}");
        }
    }
    Ok(())
}

async fn run_profile(ctx: &Ctx, command: ProfileCommand) -> Result<()> {
    match command {
        ProfileCommand::Show => {
            let user = ctx.current_user().context("Not logged in")?;
            let profile = match user.role {
                Role::JobSeeker => Profile::JobSeeker(services::fetch_job_seeker_profile(ctx).await?),
                Role::Recruiter => Profile::Recruiter(services::fetch_recruiter_profile(ctx).await?),
                Role::Admin => {
                    print_user(&user);
                    return Ok(());
                }
            };
            print_user(&user);
            print_profile(&profile);
        }
        ProfileCommand::Seeker { skills, bio, phone, location, resume } => {
            let update = JobSeekerProfileUpdate {
                skills: (!skills.is_empty()).then_some(skills),
                bio,
                phone,
                location,
                ..Default::default()
            };
            let resume = match &resume {
                Some(path) => Some(FilePart::from_path("resume", path).await?),
                None => None,
            };
            let profile = services::update_job_seeker_profile(ctx, &update, resume).await?;
            print_profile(&Profile::JobSeeker(profile));
        }
        ProfileCommand::Recruiter { company, position, website, documents } => {
            // the company-change warning compares against the cached profile
            services::fetch_recruiter_profile(ctx).await?;
            let update = RecruiterProfileUpdate { company, position, company_website: website };
            let mut parts = Vec::with_capacity(documents.len());
            for path in &documents {
                parts.push(FilePart::from_path("verificationDocuments", path).await?);
            }
            let outcome = services::update_recruiter_profile(ctx, &update, parts).await?;
            print_profile(&Profile::Recruiter(outcome.profile));
            if outcome.requires_reverification {
                println!("Company changed: your account needs to be verified again");
            }
        }
    }
    Ok(())
}

async fn run_admin(ctx: &Ctx, command: AdminCommand) -> Result<()> {
    match command {
        AdminCommand::Pending => {
            let recruiters = services::list_pending_recruiters(ctx).await?;
            if recruiters.is_empty() {
                println!("No recruiters awaiting verification");
            }
            recruiters.iter().for_each(print_user);
        }
        AdminCommand::Approve { id } => {
            let user = services::approve_recruiter(ctx, &id).await?;
            println!("Approved {}", user.email);
        }
        AdminCommand::Reject { id } => {
            let user = services::reject_recruiter(ctx, &id).await?;
            println!("Rejected {}", user.email);
        }
        AdminCommand::Users => {
            services::list_users(ctx).await?.iter().for_each(print_user);
        }
        AdminCommand::DeleteUser { id } => {
            services::delete_user(ctx, &id).await?;
            println!("Deleted user {id}");
        }
    }
    Ok(())
}

fn print_user(user: &User) {
    let status = user
        .verification_status
        .map(|s| format!(" [{s:?}]").to_lowercase())
        .unwrap_or_default();
    println!("{}  {} <{}>  {}{}", user.id, user.name, user.email, user.role.as_str(), status);
}

fn print_jobs<'a>(jobs: impl IntoIterator<Item = &'a Job>) {
    let mut any = false;
    for job in jobs {
        any = true;
        println!(
            "{}  {}  {}  {}{}",
            job.id,
            job.title,
            job.location,
            job.job_type.as_str(),
            if job.is_open() { "" } else { "  (closed)" }
        );
    }
    if !any {
        println!("No jobs found");
    }
}

fn print_job(job: &Job) {
    println!("{} [{}]", job.title, job.id);
    if let Some(company) = &job.company {
        println!("Company:   {company}");
    }
    println!("Location:  {}", job.location);
    println!("Type:      {}", job.job_type.as_str());
    if let Some(salary) = &job.salary_range {
        println!("Salary:    {} - {} {}", salary.min, salary.max, salary.currency.as_deref().unwrap_or(""));
    }
    if !job.requirements.is_empty() {
        println!("Requires:  {}", job.requirements.join(", "));
    }
    println!("Applied:   {}", job.application_count);
    println!();
    println!("{}", job.description);
}

fn print_applications(applications: &[Application]) {
    if applications.is_empty() {
        println!("No applications");
    }
    for application in applications {
        let title = application.job.as_ref().map(|j| j.title.as_str()).unwrap_or(application.job_id.as_str());
        println!("{}  {}  {}", application.id, title, application.status.as_str());
    }
}

fn print_stats(stats: &ApplicationStats) {
    for status in ApplicationStatus::ALL {
        println!("{:<9} {:>4}  {:>5.1}%", status.as_str(), stats.count(status), stats.percentage(status));
    }
    println!("acceptance rate {:.1}%", stats.acceptance_rate());
}

fn print_profile(profile: &Profile) {
    match profile {
        Profile::JobSeeker(p) => {
            println!("Skills:     {}", p.skills.join(", "));
            println!("Experience: {:.1} years", p.total_experience_years());
            if let Some(location) = &p.location {
                println!("Location:   {location}");
            }
            if let Some(resume) = &p.resume {
                println!("Resume:     {resume}");
            }
        }
        Profile::Recruiter(p) => {
            println!("Company:    {}", p.company);
            if let Some(position) = &p.position {
                println!("Position:   {position}");
            }
            println!("Documents:  {}", p.verification_documents.len());
        }
    }
}
