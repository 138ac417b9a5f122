use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Encode, FromRow, PgPool, Postgres, QueryBuilder, Type};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{
    Application, ApplicationDetails, ApplicationKind, ApplicationStatus, JudgeFields,
    MentorFields, ParticipantFields,
};
use crate::services::form_steps::{self, FormStep, StepFields};

const PARTICIPANT_COLUMNS: &str = "id, student_id, status, full_name, created_at, updated_at, \
    gender, university, program, year_of_study, phone, programming_experience, \
    data_science_experience, technical_skills, has_team, team_members, dietary_restrictions, \
    tshirt_size, motivation, heard_from, agree_to_code_of_conduct, agree_to_photo_release";

const MENTOR_COLUMNS: &str = "id, student_id, status, full_name, created_at, updated_at, \
    organization, job_title, linkedin_url, expertise_areas, experience_level, availability, \
    dietary_restrictions, tshirt_size, motivation, previous_mentoring, agree_to_code_of_conduct";

const JUDGE_COLUMNS: &str = "id, student_id, status, full_name, created_at, updated_at, \
    organization, job_title, linkedin_url, expertise_areas, judging_experience, \
    domain_expertise_level, availability, motivation, conflict_of_interest, \
    agree_to_code_of_conduct";

const KNOWN_STATUSES: [ApplicationStatus; 5] = [
    ApplicationStatus::Draft,
    ApplicationStatus::Pending,
    ApplicationStatus::Submitted,
    ApplicationStatus::Accepted,
    ApplicationStatus::Rejected,
];

fn table(kind: ApplicationKind) -> &'static str {
    match kind {
        ApplicationKind::Participant => "participant_applications",
        ApplicationKind::Mentor => "mentor_applications",
        ApplicationKind::Judge => "judge_applications",
    }
}

fn columns(kind: ApplicationKind) -> &'static str {
    match kind {
        ApplicationKind::Participant => PARTICIPANT_COLUMNS,
        ApplicationKind::Mentor => MENTOR_COLUMNS,
        ApplicationKind::Judge => JUDGE_COLUMNS,
    }
}

fn parse_status(status: &str) -> Result<ApplicationStatus> {
    status
        .parse()
        .map_err(|e: crate::models::UnknownVariant| StorageError::InvalidData(e.to_string()))
}

#[derive(FromRow)]
struct ParticipantRow {
    id: Uuid,
    student_id: Uuid,
    status: String,
    full_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    gender: Option<String>,
    university: Option<String>,
    program: Option<String>,
    year_of_study: Option<String>,
    phone: Option<String>,
    programming_experience: Option<i32>,
    data_science_experience: Option<i32>,
    technical_skills: Option<String>,
    has_team: bool,
    team_members: Option<String>,
    dietary_restrictions: Option<String>,
    tshirt_size: Option<String>,
    motivation: Option<String>,
    heard_from: Option<String>,
    agree_to_code_of_conduct: bool,
    agree_to_photo_release: bool,
}

impl TryFrom<ParticipantRow> for Application {
    type Error = StorageError;

    fn try_from(row: ParticipantRow) -> Result<Self> {
        Ok(Application {
            id: row.id,
            student_id: row.student_id,
            status: parse_status(&row.status)?,
            full_name: row.full_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
            details: ApplicationDetails::Participant(ParticipantFields {
                gender: row.gender,
                university: row.university,
                program: row.program,
                year_of_study: row.year_of_study,
                phone: row.phone,
                programming_experience: row.programming_experience,
                data_science_experience: row.data_science_experience,
                technical_skills: row.technical_skills,
                has_team: row.has_team,
                team_members: row.team_members,
                dietary_restrictions: row.dietary_restrictions,
                tshirt_size: row.tshirt_size,
                motivation: row.motivation,
                heard_from: row.heard_from,
                agree_to_code_of_conduct: row.agree_to_code_of_conduct,
                agree_to_photo_release: row.agree_to_photo_release,
            }),
        })
    }
}

#[derive(FromRow)]
struct MentorRow {
    id: Uuid,
    student_id: Uuid,
    status: String,
    full_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    organization: Option<String>,
    job_title: Option<String>,
    linkedin_url: Option<String>,
    expertise_areas: Option<String>,
    experience_level: Option<i32>,
    availability: Option<String>,
    dietary_restrictions: Vec<String>,
    tshirt_size: Option<String>,
    motivation: Option<String>,
    previous_mentoring: bool,
    agree_to_code_of_conduct: bool,
}

impl TryFrom<MentorRow> for Application {
    type Error = StorageError;

    fn try_from(row: MentorRow) -> Result<Self> {
        Ok(Application {
            id: row.id,
            student_id: row.student_id,
            status: parse_status(&row.status)?,
            full_name: row.full_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
            details: ApplicationDetails::Mentor(MentorFields {
                organization: row.organization,
                job_title: row.job_title,
                linkedin_url: row.linkedin_url,
                expertise_areas: row.expertise_areas,
                experience_level: row.experience_level,
                availability: row.availability,
                dietary_restrictions: row.dietary_restrictions,
                tshirt_size: row.tshirt_size,
                motivation: row.motivation,
                previous_mentoring: row.previous_mentoring,
                agree_to_code_of_conduct: row.agree_to_code_of_conduct,
            }),
        })
    }
}

#[derive(FromRow)]
struct JudgeRow {
    id: Uuid,
    student_id: Uuid,
    status: String,
    full_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    organization: Option<String>,
    job_title: Option<String>,
    linkedin_url: Option<String>,
    expertise_areas: Option<String>,
    judging_experience: bool,
    domain_expertise_level: Option<i32>,
    availability: Option<String>,
    motivation: Option<String>,
    conflict_of_interest: Option<String>,
    agree_to_code_of_conduct: bool,
}

impl TryFrom<JudgeRow> for Application {
    type Error = StorageError;

    fn try_from(row: JudgeRow) -> Result<Self> {
        Ok(Application {
            id: row.id,
            student_id: row.student_id,
            status: parse_status(&row.status)?,
            full_name: row.full_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
            details: ApplicationDetails::Judge(JudgeFields {
                organization: row.organization,
                job_title: row.job_title,
                linkedin_url: row.linkedin_url,
                expertise_areas: row.expertise_areas,
                judging_experience: row.judging_experience,
                domain_expertise_level: row.domain_expertise_level,
                availability: row.availability,
                motivation: row.motivation,
                conflict_of_interest: row.conflict_of_interest,
                agree_to_code_of_conduct: row.agree_to_code_of_conduct,
            }),
        })
    }
}

pub struct ApplicationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ApplicationRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, kind: ApplicationKind, id: Uuid) -> Result<Option<Application>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            columns(kind),
            table(kind)
        );
        self.fetch_optional(kind, &sql, id).await
    }

    /// Oldest application of `kind` owned by the student
    pub async fn find_first_for_student(
        &self,
        kind: ApplicationKind,
        student_id: Uuid,
    ) -> Result<Option<Application>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE student_id = $1 ORDER BY created_at ASC LIMIT 1",
            columns(kind),
            table(kind)
        );
        self.fetch_optional(kind, &sql, student_id).await
    }

    /// List applications whose status is one of the known literals
    pub async fn list(&self, kind: ApplicationKind) -> Result<Vec<Application>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE status = ANY($1) ORDER BY created_at ASC",
            columns(kind),
            table(kind)
        );
        let statuses: Vec<String> = KNOWN_STATUSES.iter().map(|s| s.to_string()).collect();

        match kind {
            ApplicationKind::Participant => {
                let rows = sqlx::query_as::<_, ParticipantRow>(&sql)
                    .bind(&statuses)
                    .fetch_all(self.pool)
                    .await?;
                rows.into_iter().map(Application::try_from).collect()
            }
            ApplicationKind::Mentor => {
                let rows = sqlx::query_as::<_, MentorRow>(&sql)
                    .bind(&statuses)
                    .fetch_all(self.pool)
                    .await?;
                rows.into_iter().map(Application::try_from).collect()
            }
            ApplicationKind::Judge => {
                let rows = sqlx::query_as::<_, JudgeRow>(&sql)
                    .bind(&statuses)
                    .fetch_all(self.pool)
                    .await?;
                rows.into_iter().map(Application::try_from).collect()
            }
        }
    }

    pub async fn count_by_status(&self, kind: ApplicationKind) -> Result<Vec<(String, i64)>> {
        let sql = format!(
            "SELECT status, COUNT(*) FROM {} GROUP BY status",
            table(kind)
        );

        let counts = sqlx::query_as::<_, (String, i64)>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(counts)
    }

    pub async fn set_status(
        &self,
        kind: ApplicationKind,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application> {
        let sql = format!(
            "UPDATE {} SET status = $2 WHERE id = $1 RETURNING {}",
            table(kind),
            columns(kind)
        );

        let updated = match kind {
            ApplicationKind::Participant => sqlx::query_as::<_, ParticipantRow>(&sql)
                .bind(id)
                .bind(status.as_str())
                .fetch_optional(self.pool)
                .await?
                .map(Application::try_from),
            ApplicationKind::Mentor => sqlx::query_as::<_, MentorRow>(&sql)
                .bind(id)
                .bind(status.as_str())
                .fetch_optional(self.pool)
                .await?
                .map(Application::try_from),
            ApplicationKind::Judge => sqlx::query_as::<_, JudgeRow>(&sql)
                .bind(id)
                .bind(status.as_str())
                .fetch_optional(self.pool)
                .await?
                .map(Application::try_from),
        };

        updated.ok_or(StorageError::NotFound)?
    }

    pub async fn delete_for_student(&self, kind: ApplicationKind, student_id: Uuid) -> Result<u64> {
        let sql = format!("DELETE FROM {} WHERE student_id = $1", table(kind));

        let result = sqlx::query(&sql)
            .bind(student_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn create(&self, application: &Application) -> Result<Application> {
        match &application.details {
            ApplicationDetails::Participant(p) => {
                let sql = format!(
                    r#"
                    INSERT INTO participant_applications ({PARTICIPANT_COLUMNS})
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                            $15, $16, $17, $18, $19, $20, $21, $22)
                    RETURNING {PARTICIPANT_COLUMNS}
                    "#
                );
                sqlx::query_as::<_, ParticipantRow>(&sql)
                    .bind(application.id)
                    .bind(application.student_id)
                    .bind(application.status.as_str())
                    .bind(&application.full_name)
                    .bind(application.created_at)
                    .bind(application.updated_at)
                    .bind(&p.gender)
                    .bind(&p.university)
                    .bind(&p.program)
                    .bind(&p.year_of_study)
                    .bind(&p.phone)
                    .bind(p.programming_experience)
                    .bind(p.data_science_experience)
                    .bind(&p.technical_skills)
                    .bind(p.has_team)
                    .bind(&p.team_members)
                    .bind(&p.dietary_restrictions)
                    .bind(&p.tshirt_size)
                    .bind(&p.motivation)
                    .bind(&p.heard_from)
                    .bind(p.agree_to_code_of_conduct)
                    .bind(p.agree_to_photo_release)
                    .fetch_one(self.pool)
                    .await?
                    .try_into()
            }
            ApplicationDetails::Mentor(m) => {
                let sql = format!(
                    r#"
                    INSERT INTO mentor_applications ({MENTOR_COLUMNS})
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                            $15, $16, $17)
                    RETURNING {MENTOR_COLUMNS}
                    "#
                );
                sqlx::query_as::<_, MentorRow>(&sql)
                    .bind(application.id)
                    .bind(application.student_id)
                    .bind(application.status.as_str())
                    .bind(&application.full_name)
                    .bind(application.created_at)
                    .bind(application.updated_at)
                    .bind(&m.organization)
                    .bind(&m.job_title)
                    .bind(&m.linkedin_url)
                    .bind(&m.expertise_areas)
                    .bind(m.experience_level)
                    .bind(&m.availability)
                    .bind(&m.dietary_restrictions)
                    .bind(&m.tshirt_size)
                    .bind(&m.motivation)
                    .bind(m.previous_mentoring)
                    .bind(m.agree_to_code_of_conduct)
                    .fetch_one(self.pool)
                    .await?
                    .try_into()
            }
            ApplicationDetails::Judge(j) => {
                let sql = format!(
                    r#"
                    INSERT INTO judge_applications ({JUDGE_COLUMNS})
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                            $15, $16)
                    RETURNING {JUDGE_COLUMNS}
                    "#
                );
                sqlx::query_as::<_, JudgeRow>(&sql)
                    .bind(application.id)
                    .bind(application.student_id)
                    .bind(application.status.as_str())
                    .bind(&application.full_name)
                    .bind(application.created_at)
                    .bind(application.updated_at)
                    .bind(&j.organization)
                    .bind(&j.job_title)
                    .bind(&j.linkedin_url)
                    .bind(&j.expertise_areas)
                    .bind(j.judging_experience)
                    .bind(j.domain_expertise_level)
                    .bind(&j.availability)
                    .bind(&j.motivation)
                    .bind(&j.conflict_of_interest)
                    .bind(j.agree_to_code_of_conduct)
                    .fetch_one(self.pool)
                    .await?
                    .try_into()
            }
        }
    }

    /// Every application of `kind` owned by the student, oldest first
    pub async fn list_for_student(
        &self,
        kind: ApplicationKind,
        student_id: Uuid,
    ) -> Result<Vec<Application>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE student_id = $1 ORDER BY created_at ASC",
            columns(kind),
            table(kind)
        );

        match kind {
            ApplicationKind::Participant => self.fetch_all_as::<ParticipantRow>(&sql, student_id).await,
            ApplicationKind::Mentor => self.fetch_all_as::<MentorRow>(&sql, student_id).await,
            ApplicationKind::Judge => self.fetch_all_as::<JudgeRow>(&sql, student_id).await,
        }
    }

    /// Rewrite the columns owned by one form step.
    ///
    /// Only that step's columns and `updated_at` are written (plus `full_name`
    /// for the personal step), so a concurrent status change or an update of
    /// another step is never overwritten.
    pub async fn update_step(
        &self,
        kind: ApplicationKind,
        id: Uuid,
        step: FormStep,
        fields: &StepFields,
    ) -> Result<Application> {
        let mut scratch = Application::draft(kind, Uuid::nil(), None);
        form_steps::apply_step(&mut scratch, step, fields)
            .map_err(|e| StorageError::InvalidData(e.to_string()))?;

        let mut builder =
            QueryBuilder::<Postgres>::new(format!("UPDATE {} SET updated_at = NOW()", table(kind)));
        if step == FormStep::Personal {
            assign(&mut builder, "full_name", scratch.full_name);
        }
        push_step_assignments(&mut builder, scratch.details, step);
        builder.push(" WHERE id = ").push_bind(id);
        builder.push(" RETURNING ").push(columns(kind));

        let updated = match kind {
            ApplicationKind::Participant => builder
                .build_query_as::<ParticipantRow>()
                .fetch_optional(self.pool)
                .await?
                .map(Application::try_from),
            ApplicationKind::Mentor => builder
                .build_query_as::<MentorRow>()
                .fetch_optional(self.pool)
                .await?
                .map(Application::try_from),
            ApplicationKind::Judge => builder
                .build_query_as::<JudgeRow>()
                .fetch_optional(self.pool)
                .await?
                .map(Application::try_from),
        };

        updated.ok_or(StorageError::NotFound)?
    }

    async fn fetch_optional(
        &self,
        kind: ApplicationKind,
        sql: &str,
        key: Uuid,
    ) -> Result<Option<Application>> {
        match kind {
            ApplicationKind::Participant => self.fetch_optional_as::<ParticipantRow>(sql, key).await,
            ApplicationKind::Mentor => self.fetch_optional_as::<MentorRow>(sql, key).await,
            ApplicationKind::Judge => self.fetch_optional_as::<JudgeRow>(sql, key).await,
        }
    }

    async fn fetch_optional_as<R>(&self, sql: &str, key: Uuid) -> Result<Option<Application>>
    where
        R: for<'r> FromRow<'r, PgRow> + Send + Unpin,
        Application: TryFrom<R, Error = StorageError>,
    {
        sqlx::query_as::<_, R>(sql)
            .bind(key)
            .fetch_optional(self.pool)
            .await?
            .map(Application::try_from)
            .transpose()
    }

    async fn fetch_all_as<R>(&self, sql: &str, key: Uuid) -> Result<Vec<Application>>
    where
        R: for<'r> FromRow<'r, PgRow> + Send + Unpin,
        Application: TryFrom<R, Error = StorageError>,
    {
        sqlx::query_as::<_, R>(sql)
            .bind(key)
            .fetch_all(self.pool)
            .await?
            .into_iter()
            .map(Application::try_from)
            .collect()
    }
}

fn assign<'args, T>(builder: &mut QueryBuilder<'args, Postgres>, column: &str, value: T)
where
    T: 'args + Encode<'args, Postgres> + Type<Postgres>,
{
    builder.push(", ").push(column).push(" = ").push_bind(value);
}

/// Pushes `column = value` for every column owned by `step`.
fn push_step_assignments(
    builder: &mut QueryBuilder<'_, Postgres>,
    details: ApplicationDetails,
    step: FormStep,
) {
    match (details, step) {
        (ApplicationDetails::Participant(p), FormStep::Personal) => {
            assign(builder, "gender", p.gender);
            assign(builder, "university", p.university);
            assign(builder, "program", p.program);
            assign(builder, "year_of_study", p.year_of_study);
            assign(builder, "phone", p.phone);
        }
        (ApplicationDetails::Participant(p), FormStep::Experience) => {
            assign(builder, "programming_experience", p.programming_experience);
            assign(builder, "data_science_experience", p.data_science_experience);
            assign(builder, "technical_skills", p.technical_skills);
            assign(builder, "has_team", p.has_team);
            assign(builder, "team_members", p.team_members);
            assign(builder, "dietary_restrictions", p.dietary_restrictions);
            assign(builder, "tshirt_size", p.tshirt_size);
        }
        (ApplicationDetails::Participant(p), FormStep::Final) => {
            assign(builder, "motivation", p.motivation);
            assign(builder, "heard_from", p.heard_from);
            assign(builder, "agree_to_code_of_conduct", p.agree_to_code_of_conduct);
            assign(builder, "agree_to_photo_release", p.agree_to_photo_release);
        }
        (ApplicationDetails::Mentor(m), FormStep::Personal) => {
            assign(builder, "organization", m.organization);
            assign(builder, "job_title", m.job_title);
            assign(builder, "linkedin_url", m.linkedin_url);
        }
        (ApplicationDetails::Mentor(m), FormStep::Experience) => {
            assign(builder, "expertise_areas", m.expertise_areas);
            assign(builder, "experience_level", m.experience_level);
            assign(builder, "availability", m.availability);
            assign(builder, "dietary_restrictions", m.dietary_restrictions);
            assign(builder, "tshirt_size", m.tshirt_size);
        }
        (ApplicationDetails::Mentor(m), FormStep::Final) => {
            assign(builder, "motivation", m.motivation);
            assign(builder, "previous_mentoring", m.previous_mentoring);
            assign(builder, "agree_to_code_of_conduct", m.agree_to_code_of_conduct);
        }
        (ApplicationDetails::Judge(j), FormStep::Personal) => {
            assign(builder, "organization", j.organization);
            assign(builder, "job_title", j.job_title);
            assign(builder, "linkedin_url", j.linkedin_url);
        }
        (ApplicationDetails::Judge(j), FormStep::Experience) => {
            assign(builder, "expertise_areas", j.expertise_areas);
            assign(builder, "judging_experience", j.judging_experience);
            assign(builder, "domain_expertise_level", j.domain_expertise_level);
            assign(builder, "availability", j.availability);
        }
        (ApplicationDetails::Judge(j), FormStep::Final) => {
            assign(builder, "motivation", j.motivation);
            assign(builder, "conflict_of_interest", j.conflict_of_interest);
            assign(builder, "agree_to_code_of_conduct", j.agree_to_code_of_conduct);
        }
    }
}
