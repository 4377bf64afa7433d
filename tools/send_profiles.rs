//! Test Profile Sender
//!
//! Generates random customer profiles, sends them to the churn service as
//! NATS requests and logs the replies.
//!
//! Usage: send-profiles [nats_url] [subject] [count] [incomplete_rate] [delay_ms]

use churn_risk_pipeline::types::{AssessmentRequest, RawCustomerProfile};
use churn_risk_pipeline::ValidationError;
use rand::Rng;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Random profile generator for exercising the service
struct ProfileGenerator {
    rng: rand::rngs::ThreadRng,
    request_counter: u64,
}

impl ProfileGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
            request_counter: 0,
        }
    }

    /// A complete profile with every field in range
    fn generate_complete(&mut self) -> AssessmentRequest {
        self.request_counter += 1;

        let balance = if self.rng.gen_bool(0.35) {
            0.0
        } else {
            self.rng.gen_range(1_000.0..250_000.0)
        };

        AssessmentRequest {
            request_id: Some(format!("req_{:08}", self.request_counter)),
            profile: RawCustomerProfile {
                geography: Some(self.random_choice(&["France", "Germany", "Spain"]).to_string()),
                gender: Some(self.random_choice(&["Female", "Male"]).to_string()),
                age: Some(self.rng.gen_range(18..=92)),
                credit_score: Some(self.rng.gen_range(300..=850)),
                balance: Some(balance),
                estimated_salary: Some(self.rng.gen_range(10_000.0..200_000.0)),
                tenure: Some(self.rng.gen_range(0..=10)),
                num_of_products: Some(self.rng.gen_range(1..=4)),
                has_credit_card: Some(self.rng.gen_bool(0.7)),
                is_active_member: Some(self.rng.gen_bool(0.5)),
            },
        }
    }

    /// A profile with a few fields left out, to exercise validation
    fn generate_incomplete(&mut self) -> AssessmentRequest {
        let mut request = self.generate_complete();
        let profile = &mut request.profile;

        if self.rng.gen_bool(0.5) {
            profile.geography = None;
        }
        if self.rng.gen_bool(0.5) {
            profile.age = None;
        }
        if self.rng.gen_bool(0.5) {
            profile.is_active_member = None;
        }
        profile.credit_score = None;

        request
    }

    fn random_choice<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices[self.rng.gen_range(0..choices.len())]
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("send_profiles=info".parse()?),
        )
        .init();

    info!("Starting Test Profile Sender");

    let args: Vec<String> = std::env::args().collect();
    let nats_url = args.get(1).map(|s| s.as_str()).unwrap_or("nats://localhost:4222");
    let subject = args.get(2).map(|s| s.as_str()).unwrap_or("churn.assess");
    let count: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(100);
    let incomplete_rate: f64 = args
        .get(4)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.1_f64)
        .clamp(0.0, 1.0);
    let delay_ms: u64 = args.get(5).and_then(|s| s.parse().ok()).unwrap_or(100);

    info!(
        nats_url = %nats_url,
        subject = %subject,
        count = count,
        incomplete_rate = incomplete_rate,
        delay_ms = delay_ms,
        "Configuration loaded"
    );

    let client = match async_nats::connect(nats_url).await {
        Ok(c) => {
            info!("Connected to NATS");
            c
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to NATS. Running in dry-run mode.");
            return run_dry_mode(count, incomplete_rate, delay_ms).await;
        }
    };

    let mut generator = ProfileGenerator::new();
    let mut rng = rand::thread_rng();
    let mut assessed = 0;
    let mut rejected = 0;

    for i in 0..count {
        let request = if rng.gen_bool(incomplete_rate) {
            generator.generate_incomplete()
        } else {
            generator.generate_complete()
        };

        let payload = serde_json::to_vec(&request)?;
        let reply = client.request(subject.to_string(), payload.into()).await?;
        let reply: serde_json::Value = serde_json::from_slice(&reply.payload)?;

        if let Some(assessment) = reply.get("assessment") {
            assessed += 1;
            info!(
                request_id = %reply["request_id"],
                tier = %assessment["tier"],
                probability = %assessment["probability"],
                "Assessed"
            );
        } else {
            rejected += 1;
            warn!(
                request_id = %reply["request_id"],
                error = %reply["error"]["message"],
                "Rejected"
            );
        }

        if (i + 1) % 10 == 0 {
            info!(
                "Sent {}/{} profiles ({} assessed, {} rejected)",
                i + 1,
                count,
                assessed,
                rejected
            );
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    info!(
        "Completed! Sent {} profiles ({} assessed, {} rejected)",
        count, assessed, rejected
    );

    Ok(())
}

/// Without NATS, profiles are checked locally and the validation outcome tallied
async fn run_dry_mode(count: u64, incomplete_rate: f64, delay_ms: u64) -> anyhow::Result<()> {
    info!("Running in dry-run mode (no NATS connection)");

    let mut generator = ProfileGenerator::new();
    let mut rng = rand::thread_rng();
    let mut complete = 0;
    let mut missing_by_field: BTreeMap<&'static str, u64> = BTreeMap::new();

    for _ in 0..count {
        let request = if rng.gen_bool(incomplete_rate) {
            generator.generate_incomplete()
        } else {
            generator.generate_complete()
        };

        match request.profile.validate() {
            Ok(profile) => {
                complete += 1;
                debug!(
                    request_id = ?request.request_id,
                    geography = %profile.geography,
                    age = profile.age,
                    balance = profile.balance,
                    "Profile ready for assessment"
                );
            }
            Err(ValidationError::MissingFields(fields)) => {
                for field in fields {
                    *missing_by_field.entry(field).or_default() += 1;
                }
            }
            Err(e) => warn!(
                request_id = ?request.request_id,
                error = %e,
                "Generated profile out of range"
            ),
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    info!(
        complete,
        incomplete = count - complete,
        missing = ?missing_by_field,
        "Dry run complete"
    );
    Ok(())
}
