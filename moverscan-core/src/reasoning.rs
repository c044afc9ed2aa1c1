//! Reasoning text for setups.
//!
//! Each setup type has a small pool of templates parameterized with the
//! entry/stop/risk numbers. Which template is used is the only free choice
//! here and it never feeds back into trade math.
//!
//! `SeededReasoning` derives its choice from a master seed and the symbol
//! via BLAKE3, so the same seed gives the same text for a symbol no matter
//! how many other candidates were processed before it.

use crate::domain::SetupType;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Numbers a template may reference.
#[derive(Debug, Clone, Copy)]
pub struct ReasoningContext<'a> {
    pub symbol: &'a str,
    pub setup_type: SetupType,
    pub entry: f64,
    pub stop: f64,
    pub risk_pct: f64,
}

/// Produces the free-text reasoning attached to a setup.
pub trait ReasoningFormatter: Send + Sync {
    fn explain(&self, ctx: &ReasoningContext<'_>) -> String;
}

type Template = fn(&ReasoningContext<'_>) -> String;

const PULLBACK_TEMPLATES: [Template; 3] = [pullback_reclaim, pullback_support, pullback_discount];
const BREAKOUT_TEMPLATES: [Template; 3] = [breakout_range, breakout_compression, breakout_retest];

/// Template pool for a setup type.
pub fn templates(setup_type: SetupType) -> &'static [Template] {
    match setup_type {
        SetupType::Pullback4h20Ema => &PULLBACK_TEMPLATES,
        SetupType::Breakout4hRange => &BREAKOUT_TEMPLATES,
    }
}

/// Render template `index` (wrapped to the pool size).
pub fn render(ctx: &ReasoningContext<'_>, index: usize) -> String {
    let pool = templates(ctx.setup_type);
    pool[index % pool.len()](ctx)
}

/// Deterministic choice from a master seed.
#[derive(Debug, Clone)]
pub struct SeededReasoning {
    seed: u64,
}

impl SeededReasoning {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Sub-seed for one (symbol, setup type) pair, independent of call order.
    pub fn sub_seed(&self, symbol: &str, setup_type: SetupType) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.seed.to_le_bytes());
        hasher.update(symbol.as_bytes());
        hasher.update(setup_type.as_str().as_bytes());
        let hash = hasher.finalize();
        let mut first = [0u8; 8];
        first.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(first)
    }
}

impl ReasoningFormatter for SeededReasoning {
    fn explain(&self, ctx: &ReasoningContext<'_>) -> String {
        let mut rng = StdRng::seed_from_u64(self.sub_seed(ctx.symbol, ctx.setup_type));
        let index = rng.gen_range(0..templates(ctx.setup_type).len());
        render(ctx, index)
    }
}

/// Free choice from the thread RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomReasoning;

impl ReasoningFormatter for RandomReasoning {
    fn explain(&self, ctx: &ReasoningContext<'_>) -> String {
        let index = rand::thread_rng().gen_range(0..templates(ctx.setup_type).len());
        render(ctx, index)
    }
}

/// Price with precision that still reads for sub-cent coins.
fn price(p: f64) -> String {
    if p >= 100.0 {
        format!("{p:.2}")
    } else if p >= 1.0 {
        format!("{p:.4}")
    } else {
        format!("{p:.8}")
    }
}

fn pullback_reclaim(c: &ReasoningContext<'_>) -> String {
    format!(
        "{} pulled back into the rising 4h 20 EMA while holding above the 50 EMA. \
         Entry near {} with a stop at {} risks {:.2}%.",
        c.symbol,
        price(c.entry),
        price(c.stop),
        c.risk_pct
    )
}

fn pullback_support(c: &ReasoningContext<'_>) -> String {
    format!(
        "Daily and 4h trends aligned; {} is retesting dynamic support at the 20 EMA. \
         Buy zone from {}, invalidation below {} ({:.2}% risk).",
        c.symbol,
        price(c.entry),
        price(c.stop),
        c.risk_pct
    )
}

fn pullback_discount(c: &ReasoningContext<'_>) -> String {
    format!(
        "Healthy volume on the push, orderly dip on {}. Looking for continuation from {} \
         with the stop under the swing low at {}, {:.2}% from entry.",
        c.symbol,
        price(c.entry),
        price(c.stop),
        c.risk_pct
    )
}

fn breakout_range(c: &ReasoningContext<'_>) -> String {
    format!(
        "{} is pressing the top of a tight 4h range with the EMAs stacked bullish. \
         Trigger above {}, stop under the range at {} ({:.2}% risk).",
        c.symbol,
        price(c.entry),
        price(c.stop),
        c.risk_pct
    )
}

fn breakout_compression(c: &ReasoningContext<'_>) -> String {
    format!(
        "Volatility compressed on {} after the move. A close through {} opens continuation; \
         the setup is wrong below {}. Risk {:.2}%.",
        c.symbol,
        price(c.entry),
        price(c.stop),
        c.risk_pct
    )
}

fn breakout_retest(c: &ReasoningContext<'_>) -> String {
    format!(
        "Range breakout watch on {}: entry {}, stop {}, {:.2}% to invalidation.",
        c.symbol,
        price(c.entry),
        price(c.stop),
        c.risk_pct
    )
}
