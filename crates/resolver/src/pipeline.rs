// ABOUTME: ResolverPipeline runs strategies sequentially in priority order and stops at the first win.
// ABOUTME: Each strategy is bounded by its budget; timeouts and misses advance to the next strategy.

use std::fmt;

use tokio::time::{timeout, Instant};

use crate::model::{MethodTag, ValidatedLogo};
use crate::options::Options;
use crate::strategies::{standard_strategies, ResolveContext, Strategy};

/// Pipeline states. `Success` and `Exhausted` are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Pending,
    /// Running the strategy at this index.
    Trying(usize),
    Success(ValidatedLogo),
    Exhausted,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Success(_) | PipelineState::Exhausted)
    }
}

/// An ordered collection of strategies.
pub struct ResolverPipeline {
    strategies: Vec<Box<dyn Strategy>>,
}

impl ResolverPipeline {
    /// A pipeline over the given strategies, run in the given order.
    pub fn new(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    /// The five standard strategies in priority order.
    pub fn standard(opts: &Options) -> Self {
        Self::new(standard_strategies(opts))
    }

    /// Method tags in execution order.
    pub fn methods(&self) -> Vec<MethodTag> {
        self.strategies.iter().map(|s| s.method()).collect()
    }

    /// Drive the state machine to a terminal state.
    ///
    /// No strategy runs after one succeeds, and a failed strategy is never retried.
    pub async fn run(&self, ctx: &ResolveContext<'_>) -> PipelineState {
        let mut state = PipelineState::Pending;
        loop {
            state = match state {
                PipelineState::Pending => self.advance(None),
                PipelineState::Trying(index) => self.step(index, ctx).await,
                terminal => return terminal,
            };
        }
    }

    async fn step(&self, index: usize, ctx: &ResolveContext<'_>) -> PipelineState {
        let Some(strategy) = self.strategies.get(index) else {
            return PipelineState::Exhausted;
        };
        let method = strategy.method();
        let budget = strategy.budget(ctx.options());
        let started = Instant::now();

        match timeout(budget, strategy.try_resolve(ctx)).await {
            Ok(Some(logo)) => {
                tracing::info!(
                    url = %ctx.target(),
                    method = %logo.method(),
                    confidence = %logo.confidence(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "logo resolved"
                );
                PipelineState::Success(logo)
            }
            Ok(None) => {
                tracing::debug!(
                    url = %ctx.target(),
                    method = %method,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "strategy found nothing"
                );
                self.advance(Some(index))
            }
            Err(_) => {
                tracing::debug!(
                    url = %ctx.target(),
                    method = %method,
                    budget_ms = budget.as_millis() as u64,
                    "strategy exceeded its budget"
                );
                self.advance(Some(index))
            }
        }
    }

    fn advance(&self, current: Option<usize>) -> PipelineState {
        let next = current.map_or(0, |i| i + 1);
        if next < self.strategies.len() {
            PipelineState::Trying(next)
        } else {
            PipelineState::Exhausted
        }
    }
}

impl fmt::Debug for ResolverPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverPipeline")
            .field("methods", &self.methods())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Candidate, ConfidenceTier};
    use crate::urls::NormalizedUrl;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Fake strategy: optionally sleeps, then returns an inline logo or nothing.
    struct Fake {
        method: MethodTag,
        succeeds: bool,
        delay: Duration,
        calls: Arc<AtomicUsize>,
    }

    impl Fake {
        fn boxed(method: MethodTag, succeeds: bool, calls: &Arc<AtomicUsize>) -> Box<dyn Strategy> {
            Box::new(Self {
                method,
                succeeds,
                delay: Duration::ZERO,
                calls: Arc::clone(calls),
            })
        }
    }

    #[async_trait]
    impl Strategy for Fake {
        fn method(&self) -> MethodTag {
            self.method
        }

        async fn try_resolve(&self, ctx: &ResolveContext<'_>) -> Option<ValidatedLogo> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if !self.succeeds {
                return None;
            }
            ctx.validate(
                Candidate::inline("data:image/svg+xml;base64,PHN2Zy8+", self.method),
                ConfidenceTier::Medium,
            )
            .await
        }
    }

    async fn run_pipeline(pipeline: &ResolverPipeline, opts: &Options) -> PipelineState {
        let target = NormalizedUrl::parse("nike.com").unwrap();
        let http = reqwest::Client::new();
        let ctx = ResolveContext::new(&target, &http, opts);
        pipeline.run(&ctx).await
    }

    #[tokio::test]
    async fn earliest_success_wins_and_later_strategies_do_not_run() {
        let calls = Arc::new(AtomicUsize::new(0));
        let later = Arc::new(AtomicUsize::new(0));
        let pipeline = ResolverPipeline::new(vec![
            Fake::boxed(MethodTag::DomainLogoService, false, &calls),
            Fake::boxed(MethodTag::MarkupScrape, true, &calls),
            Fake::boxed(MethodTag::SocialMeta, true, &later),
            Fake::boxed(MethodTag::FaviconService, true, &later),
        ]);

        let state = run_pipeline(&pipeline, &Options::default()).await;
        match state {
            PipelineState::Success(logo) => assert_eq!(logo.method(), MethodTag::MarkupScrape),
            other => panic!("expected success, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(later.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn all_misses_exhaust_after_one_attempt_each() {
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = ResolverPipeline::new(
            MethodTag::PRIORITY
                .iter()
                .map(|m| Fake::boxed(*m, false, &calls))
                .collect(),
        );

        let state = run_pipeline(&pipeline, &Options::default()).await;
        assert_eq!(state, PipelineState::Exhausted);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn empty_pipeline_is_exhausted() {
        let pipeline = ResolverPipeline::new(Vec::new());
        assert_eq!(
            run_pipeline(&pipeline, &Options::default()).await,
            PipelineState::Exhausted
        );
    }

    #[tokio::test]
    async fn hung_strategy_is_cut_off_at_budget() {
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = ResolverPipeline::new(vec![
            Box::new(Fake {
                method: MethodTag::DomainLogoService,
                succeeds: true,
                delay: Duration::from_secs(30),
                calls: Arc::clone(&calls),
            }),
            Fake::boxed(MethodTag::SocialMeta, true, &calls),
        ]);
        let opts = Options {
            strategy_budget: Duration::from_millis(100),
            ..Default::default()
        };

        let started = std::time::Instant::now();
        let state = run_pipeline(&pipeline, &opts).await;
        assert!(started.elapsed() < Duration::from_secs(5));
        match state {
            PipelineState::Success(logo) => assert_eq!(logo.method(), MethodTag::SocialMeta),
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn terminal_states() {
        assert!(PipelineState::Exhausted.is_terminal());
        assert!(!PipelineState::Pending.is_terminal());
        assert!(!PipelineState::Trying(2).is_terminal());
    }

    #[test]
    fn standard_pipeline_lists_methods_in_priority_order() {
        let pipeline = ResolverPipeline::standard(&Options::default());
        assert_eq!(pipeline.methods(), MethodTag::PRIORITY.to_vec());
    }
}
