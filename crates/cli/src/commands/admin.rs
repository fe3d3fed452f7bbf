//! Admin dashboard commands.
//!
//! # Usage
//!
//! ```bash
//! luxtime admin stats
//! luxtime admin users
//! luxtime admin user-status 12 --inactive
//! luxtime admin store-status 3 approved
//! luxtime admin store-status 4 rejected --reason "Documentação incompleta"
//! luxtime admin assign 8 --evaluator 2
//! luxtime admin add-evaluator --user-id 15 --specialty Rolex --years 7 --level senior
//! ```

use clap::{Args, Subcommand};
use luxtime_core::{
    CertificationLevel, EvaluationId, EvaluationStatus, EvaluatorId, NewEvaluator, StoreId,
    StoreStatus, UserId,
};

use super::{CommandError, Context, print_json};

#[derive(Subcommand)]
pub enum AdminAction {
    /// List accounts
    Users,
    /// Activate or suspend an account
    UserStatus {
        id: UserId,
        #[command(flatten)]
        active: ActiveFlag,
    },
    /// List stores
    Stores,
    /// Approve or reject a store (`pending`, `approved`, `rejected`)
    StoreStatus {
        id: StoreId,
        status: StoreStatus,
        /// Why the store was rejected
        #[arg(long)]
        reason: Option<String>,
    },
    /// List the evaluation queue
    Evaluations,
    /// Assign an evaluation to an evaluator
    Assign {
        id: EvaluationId,
        #[arg(long)]
        evaluator: EvaluatorId,
    },
    /// Move an evaluation along (`pending`, `in_progress`, `completed`, `approved`, `rejected`)
    EvaluationStatus {
        id: EvaluationId,
        status: EvaluationStatus,
    },
    /// List evaluators
    Evaluators,
    /// List evaluators free to take work
    AvailableEvaluators,
    /// Promote an account to evaluator
    AddEvaluator(AddEvaluatorArgs),
    /// Activate or deactivate an evaluator
    EvaluatorStatus {
        id: EvaluatorId,
        #[command(flatten)]
        active: ActiveFlag,
    },
    /// Dashboard counters
    Stats,
    /// Recent platform activity
    Activity,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct ActiveFlag {
    #[arg(long)]
    active: bool,
    #[arg(long)]
    inactive: bool,
}

impl ActiveFlag {
    const fn is_active(&self) -> bool {
        self.active && !self.inactive
    }
}

#[derive(Args)]
pub struct AddEvaluatorArgs {
    /// Account to promote
    #[arg(long)]
    user_id: UserId,
    /// Brand or area of expertise (repeatable)
    #[arg(long = "specialty")]
    specialties: Vec<String>,
    /// Years of experience
    #[arg(long = "years", default_value_t = 0)]
    years_experience: u32,
    /// `junior`, `senior` or `master`
    #[arg(long = "level", default_value = "junior")]
    certification_level: CertificationLevel,
    #[arg(long)]
    notes: Option<String>,
}

pub async fn run(ctx: &Context, action: AdminAction) -> Result<(), CommandError> {
    let user = ctx.require_user().await?;
    if !user.is_admin() {
        tracing::warn!("{} is not an admin; the server will likely refuse", user.email);
    }

    match action {
        AdminAction::Users => print_json(&ctx.api.admin_users().await?),
        AdminAction::UserStatus { id, active } => {
            ctx.api.set_user_active(id, active.is_active()).await?;
            print_json(&serde_json::json!({ "id": id, "is_active": active.is_active() }))
        }
        AdminAction::Stores => print_json(&ctx.api.admin_stores().await?),
        AdminAction::StoreStatus { id, status, reason } => {
            ctx.api
                .set_store_status(id, status, reason.as_deref())
                .await?;
            print_json(&serde_json::json!({ "id": id, "status": status, "reason": reason }))
        }
        AdminAction::Evaluations => print_json(&ctx.api.admin_evaluations().await?),
        AdminAction::Assign { id, evaluator } => {
            ctx.api.assign_evaluator(id, evaluator).await?;
            print_json(&serde_json::json!({ "id": id, "evaluator_id": evaluator }))
        }
        AdminAction::EvaluationStatus { id, status } => {
            ctx.api.set_evaluation_status(id, status).await?;
            print_json(&serde_json::json!({ "id": id, "status": status }))
        }
        AdminAction::Evaluators => print_json(&ctx.api.admin_evaluators().await?),
        AdminAction::AvailableEvaluators => print_json(&ctx.api.available_evaluators().await?),
        AdminAction::AddEvaluator(args) => {
            let evaluator = NewEvaluator {
                user_id: args.user_id,
                specialties: args.specialties,
                years_experience: args.years_experience,
                certification_level: args.certification_level,
                notes: args.notes,
            };
            print_json(&ctx.api.create_evaluator(&evaluator).await?)
        }
        AdminAction::EvaluatorStatus { id, active } => {
            ctx.api.set_evaluator_active(id, active.is_active()).await?;
            print_json(&serde_json::json!({ "id": id, "is_active": active.is_active() }))
        }
        AdminAction::Stats => print_json(&ctx.api.dashboard_stats().await?),
        AdminAction::Activity => print_json(&ctx.api.recent_activity().await?),
    }
}
