use sqlx::SqliteConnection;

use super::community::CommunityRepository;
use super::problem::ProblemRepository;
use super::user::UserRepository;
use crate::error::Result;
use crate::models::{ContentTarget, TargetKind, TargetRef};

/// Resolves typed `(kind, id)` references to loaded models and writes them
/// back. Each kind is handled by the repository that owns its table.
pub struct TargetRepository<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> TargetRepository<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        Self { conn }
    }

    pub async fn load(&mut self, target: TargetRef) -> Result<ContentTarget> {
        let conn = &mut *self.conn;
        let loaded = match target.kind {
            TargetKind::Comment => {
                ContentTarget::Comment(CommunityRepository::new(conn).find_comment(target.id).await?)
            }
            TargetKind::Solution => {
                ContentTarget::Solution(CommunityRepository::new(conn).find_solution(target.id).await?)
            }
            TargetKind::Problem => {
                ContentTarget::Problem(ProblemRepository::new(conn).find_by_id(target.id).await?)
            }
            TargetKind::Profile => {
                ContentTarget::Profile(UserRepository::new(conn).find_by_id(target.id).await?)
            }
        };

        Ok(loaded)
    }

    pub async fn save(&mut self, target: &ContentTarget) -> Result<()> {
        let conn = &mut *self.conn;
        match target {
            ContentTarget::Comment(comment) => CommunityRepository::new(conn).save_comment(comment).await,
            ContentTarget::Solution(solution) => {
                CommunityRepository::new(conn).save_solution(solution).await
            }
            ContentTarget::Problem(problem) => ProblemRepository::new(conn).save(problem).await,
            ContentTarget::Profile(user) => UserRepository::new(conn).save_profile(user).await,
        }
    }
}
