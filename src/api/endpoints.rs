// REST paths consumed by the resource services.

pub const LOGIN: &str = "/auth/login";
pub const SIGNUP: &str = "/auth/signup";

pub const ALL_JOBS: &str = "/jobs/AllJobs";
pub const MY_JOBS: &str = "/jobs/my-jobs";
pub const JOBS: &str = "/jobs";

pub const MY_APPLICATIONS: &str = "/application/applied";

pub const JOB_SEEKER_PROFILE: &str = "/profile/jobseeker/me";
pub const JOB_SEEKER_PROFILE_UPDATE: &str = "/profile/jobseeker/update";
pub const RECRUITER_PROFILE: &str = "/profile/recruiter/me";
pub const RECRUITER_PROFILE_UPDATE: &str = "/profile/recruiter/update";

pub const PENDING_RECRUITERS: &str = "/admin/recruiters";
pub const USERS: &str = "/admin/users";

pub fn job(id: &str) -> String {
    format!("{JOBS}/{id}")
}

pub fn apply(job_id: &str) -> String {
    format!("/applications/apply/{job_id}")
}

pub fn job_applications(job_id: &str) -> String {
    format!("/applications/applications/{job_id}")
}

pub fn accept_application(id: &str) -> String {
    format!("/applications/accept/{id}")
}

pub fn reject_application(id: &str) -> String {
    format!("/applications/reject/{id}")
}

pub fn withdraw_application(id: &str) -> String {
    format!("/applications/withdraw/{id}")
}

pub fn verify_recruiter(id: &str) -> String {
    format!("{PENDING_RECRUITERS}/{id}/verify")
}

pub fn user(id: &str) -> String {
    format!("{USERS}/{id}")
}
