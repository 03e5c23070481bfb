use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// The four currencies the organization operates in. Everything else converts at 0 and
/// surfaces immediately in the dashboard numbers.
pub const SUPPORTED_CURRENCIES: [&str; 4] = ["USD", "EUR", "KZT", "TRY"];

/// Static USD multipliers, the table of last resort. Defined exactly once; every
/// consumer goes through [`CurrencyService`].
const FALLBACK_RATES: [(&str, f64); 4] = [
    ("USD", 1.0),
    ("EUR", 1.08),
    ("KZT", 0.0021),
    ("TRY", 0.031),
];

/// Live rates older than this are refetched on next use.
const CACHE_TTL: Duration = Duration::from_secs(3600);

/// Wire shape of the live-rates endpoint: `{"rates": {"EUR": 0.92, ...}}`, quoted as
/// units-per-USD.
#[derive(Deserialize)]
struct LiveRatesBody {
    rates: HashMap<String, f64>,
}

struct CachedRates {
    fetched_at: Instant,
    rates: HashMap<String, f64>,
}

/// RatesInEffect
///
/// The conversion table a request actually used, tagged with its origin so the
/// `/rates` endpoint can report it.
pub struct RatesInEffect {
    pub rates: HashMap<String, f64>,
    pub source: &'static str,
}

/// CurrencyService
///
/// Currency conversion with a single-slot, one-hour in-process cache over the live
/// rates endpoint and the static table as fallback on any fetch or parse failure.
/// Two requests racing an expired slot may both fetch; the second write wins and the
/// values are interchangeable.
pub struct CurrencyService {
    client: reqwest::Client,
    rates_url: String,
    cache: RwLock<Option<CachedRates>>,
}

/// Shared handle stored in the application state.
pub type CurrencyState = Arc<CurrencyService>;

impl CurrencyService {
    pub fn new(rates_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            rates_url,
            cache: RwLock::new(None),
        }
    }

    /// The static table as a map. Public so tests can assert the identity
    /// `convert(amount, cur) == amount * rate[cur]` against known values.
    pub fn fallback_rates() -> HashMap<String, f64> {
        FALLBACK_RATES
            .iter()
            .map(|(c, r)| (c.to_string(), *r))
            .collect()
    }

    /// Straight multiplication against a given table. Unknown currencies convert at 0.
    pub fn convert_with(rates: &HashMap<String, f64>, amount: f64, currency: &str) -> f64 {
        amount * rates.get(currency).copied().unwrap_or(0.0)
    }

    /// rates
    ///
    /// Returns the table currently in effect: the cached live table while fresh, a
    /// freshly fetched one when the slot expired, or the static fallback when the
    /// fetch fails. Failures are not cached, so the next call retries.
    pub async fn rates(&self) -> RatesInEffect {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < CACHE_TTL {
                    return RatesInEffect {
                        rates: cached.rates.clone(),
                        source: "live",
                    };
                }
            }
        }

        match self.fetch_live().await {
            Some(rates) => {
                let mut cache = self.cache.write().await;
                *cache = Some(CachedRates {
                    fetched_at: Instant::now(),
                    rates: rates.clone(),
                });
                RatesInEffect {
                    rates,
                    source: "live",
                }
            }
            None => RatesInEffect {
                rates: Self::fallback_rates(),
                source: "fallback",
            },
        }
    }

    /// Converts an amount into USD using whatever table [`Self::rates`] yields.
    pub async fn convert_to_usd(&self, amount: f64, currency: &str) -> f64 {
        let in_effect = self.rates().await;
        Self::convert_with(&in_effect.rates, amount, currency)
    }

    /// fetch_live
    ///
    /// One GET against the rates endpoint. The endpoint quotes units-per-USD, so the
    /// USD multiplier for each supported currency is the reciprocal. Any transport,
    /// status, or shape problem yields None.
    async fn fetch_live(&self) -> Option<HashMap<String, f64>> {
        let response = self.client.get(&self.rates_url).send().await.ok()?;
        if !response.status().is_success() {
            tracing::warn!("rates endpoint returned {}", response.status());
            return None;
        }
        let body: LiveRatesBody = response.json().await.ok()?;

        let mut rates = HashMap::new();
        for code in SUPPORTED_CURRENCIES {
            if code == "USD" {
                rates.insert(code.to_string(), 1.0);
                continue;
            }
            match body.rates.get(code) {
                Some(per_usd) if *per_usd > 0.0 => {
                    rates.insert(code.to_string(), 1.0 / per_usd);
                }
                // A table missing a supported currency is unusable; fall back whole.
                _ => {
                    tracing::warn!("live rates missing {code}, using fallback table");
                    return None;
                }
            }
        }
        Some(rates)
    }
}
