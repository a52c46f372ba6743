use crate::infra::{in_memory_stack, InMemoryStack, DEMO_JOB_ID};
use clap::{ArgGroup, Args};
use hireflow::config::AppConfig;
use hireflow::error::AppError;
use hireflow::workflows::placement::applications::{
    Actor, ApplicationRecord, ApplicationServiceError, ApplicationStatus, CandidateProfile,
    FileKind, FileReference, ScreeningAnswer, SubmissionRequest,
};
use hireflow::workflows::placement::commission::{
    CommissionEngine, CommissionQuote, CommissionSettings, CommissionType, JobCommissionTerms,
};
use hireflow::workflows::placement::jobs::{JobCommissionSnapshot, JobId};

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Listing the demo candidate applies to
    #[arg(long, default_value = DEMO_JOB_ID)]
    pub(crate) job_id: String,
    /// Stop at the offer stage instead of recording a hire and payout
    #[arg(long)]
    pub(crate) skip_hire: bool,
}

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("branch")
        .required(true)
        .args(["percentage", "fixed_amount"])
))]
pub(crate) struct CommissionQuoteArgs {
    /// Upper bound of the advertised salary range
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) salary_max: f64,
    /// Commission as a percentage of the maximum salary
    #[arg(long)]
    pub(crate) percentage: Option<f64>,
    /// Flat commission amount
    #[arg(long)]
    pub(crate) fixed_amount: Option<f64>,
    /// Share of the commission retained by the platform (defaults to configuration)
    #[arg(long)]
    pub(crate) reduction: Option<f64>,
}

pub(crate) fn run_commission_quote(args: CommissionQuoteArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let quote = quote_from_args(&args, config.commission.clone());
    render_quote(&quote, &config.commission.currency);
    Ok(())
}

fn quote_from_args(args: &CommissionQuoteArgs, settings: CommissionSettings) -> CommissionQuote {
    let reduction = args
        .reduction
        .unwrap_or(settings.default_reduction_percentage);
    let terms = match (args.percentage, args.fixed_amount) {
        (_, Some(fixed_amount)) => JobCommissionTerms::fixed(fixed_amount, reduction),
        (percentage, None) => JobCommissionTerms::percentage(percentage.unwrap_or(0.0), reduction),
    };

    CommissionEngine::new(settings).quote(&terms, args.salary_max)
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let stack = in_memory_stack(config.commission);
    let hired = walkthrough(&stack, &args)?;

    if let Some(record) = hired {
        println!(
            "\nDemo complete: {} hired, {} payout(s) on the ledger",
            record.application.id,
            stack.payouts.records().len()
        );
    }
    Ok(())
}

/// Submission, blocked duplicate, review pipeline, and hire. Returns the hired record unless
/// the hire step was skipped.
fn walkthrough(
    stack: &InMemoryStack,
    args: &DemoArgs,
) -> Result<Option<ApplicationRecord>, AppError> {
    let service = &stack.service;
    let job_id = JobId(args.job_id.clone());
    let currency = service.commission_settings().currency.clone();

    println!("Hireflow placement demo");
    println!("Listing: {job_id}");
    let quote = service.commission_for_job(&job_id)?;
    render_quote(&quote, &currency);

    let record = service.submit(demo_submission(&job_id))?;
    println!(
        "\nSubmitted {} for {} ({})",
        record.application.id,
        record.application.candidate.full_name,
        record.application.status()
    );

    let mut repeat = demo_submission(&job_id);
    repeat.email = "  Kavya.Nair@Example.in ".to_string();
    repeat.phone = "0091 98450-12345".to_string();
    repeat.submitted_by = Actor::recruiter("rec-demo-2");
    match service.submit(repeat) {
        Err(ApplicationServiceError::Validation(result)) => {
            println!("Second recruiter blocked: {result}");
        }
        Ok(duplicate) => {
            println!(
                "Unexpected: duplicate accepted as {}",
                duplicate.application.id
            );
        }
        Err(other) => return Err(other.into()),
    }

    let ops = Actor::internal("demo-ops");
    let mut pipeline = vec![
        ApplicationStatus::Reviewed,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::InterviewInProcess,
        ApplicationStatus::Offered,
    ];
    if !args.skip_hire {
        pipeline.push(ApplicationStatus::Hired);
    }

    let mut current = record;
    for status in pipeline {
        current = service.change_status(&current.application.id, status, &ops, None)?;
    }

    println!("\nTimeline (version {})", current.version);
    for entry in current.status_view().timeline {
        println!("- {:<24} {}", entry.status, entry.at);
    }

    if args.skip_hire {
        return Ok(None);
    }

    if let Some(payout) = stack
        .payouts
        .records()
        .into_iter()
        .find(|payout| payout.application_id == current.application.id)
    {
        println!(
            "\nPayout for {}: recruiter {:.2} {} / platform {:.2} {}",
            payout.recruiter_id,
            payout.breakdown.recruiter_amount,
            payout.currency,
            payout.breakdown.platform_fee_amount,
            payout.currency
        );
    }

    if let Some(snapshot) = quote_listing(&job_id, &quote) {
        stack.jobs.upsert(snapshot);
        let requote = service.commission_for_job(&job_id)?;
        println!(
            "Listing terms edited after hire; new quote {:.2} {currency}, recorded payout unchanged",
            requote.breakdown.recruiter_amount
        );
    }

    Ok(Some(current))
}

/// Listing with the opposite commission type, used to show that payouts are snapshots.
fn quote_listing(job_id: &JobId, quote: &CommissionQuote) -> Option<JobCommissionSnapshot> {
    if quote.breakdown.original_amount <= 0.0 {
        return None;
    }
    let terms = match quote.breakdown.commission_type {
        CommissionType::Percentage => JobCommissionTerms::fixed(quote.breakdown.original_amount, 50.0),
        CommissionType::Fixed => JobCommissionTerms::percentage(10.0, 40.0),
    };
    Some(JobCommissionSnapshot {
        job_id: job_id.clone(),
        title: "Edited listing".to_string(),
        terms,
        salary_max: quote.breakdown.original_amount * 10.0,
    })
}

fn render_quote(quote: &CommissionQuote, currency: &str) {
    let breakdown = &quote.breakdown;
    match breakdown.commission_type {
        CommissionType::Percentage => println!(
            "Commission: {:.2}% ({:.2} {currency}) -> recruiter {:.2}% / platform {:.2}%",
            breakdown.original_percentage,
            breakdown.original_amount,
            breakdown.recruiter_percentage,
            breakdown.platform_fee_percentage
        ),
        CommissionType::Fixed => println!(
            "Commission: fixed {:.2} {currency}",
            breakdown.original_amount
        ),
    }
    println!(
        "Split: recruiter {:.2} {currency} / platform {:.2} {currency}",
        breakdown.recruiter_amount, breakdown.platform_fee_amount
    );
    for anomaly in &quote.anomalies {
        println!("Warning: {}", anomaly.summary());
    }
}

fn demo_submission(job_id: &JobId) -> SubmissionRequest {
    SubmissionRequest {
        job_id: job_id.clone(),
        email: "kavya.nair@example.in".to_string(),
        phone: "+91 98450 12345".to_string(),
        candidate: CandidateProfile {
            full_name: "Kavya Nair".to_string(),
            current_title: Some("Platform Engineer".to_string()),
            current_company: Some("Lumen Retail".to_string()),
            location: Some("Bengaluru".to_string()),
            total_experience_years: Some(7.0),
            current_salary: Some(2_000_000.0),
            expected_salary: Some(2_400_000.0),
            notice_period_days: Some(60),
        },
        submitted_by: Actor::recruiter("rec-demo-1"),
        screening_answers: vec![ScreeningAnswer {
            question_id: "work-mode".to_string(),
            answer: "hybrid".to_string(),
        }],
        attachments: vec![FileReference {
            name: "kavya-nair-resume.pdf".to_string(),
            kind: FileKind::Resume,
            storage_key: "demo/resumes/kavya-nair.pdf".to_string(),
        }],
    }
}
