//! Analysis categories and their per-category JSON schemas and defaults.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Confidence reported by every fallback structure.
pub const FALLBACK_CONFIDENCE: u8 = 50;

/// One of the fixed analysis topics a pitch document can be examined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisCategory {
    Company,
    Financial,
    Team,
    Market,
    Risk,
    Recommendation,
}

impl AnalysisCategory {
    /// All categories, in the order they are advertised to API clients.
    pub const ALL: [AnalysisCategory; 6] = [
        Self::Company,
        Self::Financial,
        Self::Team,
        Self::Market,
        Self::Risk,
        Self::Recommendation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Financial => "financial",
            Self::Team => "team",
            Self::Market => "market",
            Self::Risk => "risk",
            Self::Recommendation => "recommendation",
        }
    }

    /// Parse a category name. Matching is exact; `"Company"` is not a category.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "company" => Some(Self::Company),
            "financial" => Some(Self::Financial),
            "team" => Some(Self::Team),
            "market" => Some(Self::Market),
            "risk" => Some(Self::Risk),
            "recommendation" => Some(Self::Recommendation),
            _ => None,
        }
    }

    /// Names of every category, as accepted by [`AnalysisCategory::from_str`].
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.as_str()).collect()
    }

    /// Instruction line and example JSON the model must follow for this category.
    pub fn schema_instructions(&self) -> &'static str {
        match self {
            Self::Company => COMPANY_SCHEMA,
            Self::Financial => FINANCIAL_SCHEMA,
            Self::Team => TEAM_SCHEMA,
            Self::Market => MARKET_SCHEMA,
            Self::Risk => RISK_SCHEMA,
            Self::Recommendation => RECOMMENDATION_SCHEMA,
        }
    }

    /// Well-shaped placeholder used when the model output cannot be parsed.
    pub fn fallback(&self) -> Value {
        match self {
            Self::Company => json!({
                "companyInfo": {
                    "name": "Unknown Company",
                    "industry": "Unknown",
                    "description": "Could not extract company information"
                },
                "confidence": FALLBACK_CONFIDENCE
            }),
            Self::Financial => json!({
                "financialMetrics": {
                    "currentRevenue": 0,
                    "revenueGrowthRate": 0,
                    "grossMargin": 0
                },
                "unitEconomics": {
                    "cac": 0,
                    "ltv": 0,
                    "paybackPeriod": 0,
                    "churnRate": 0
                },
                "confidence": FALLBACK_CONFIDENCE
            }),
            Self::Team => json!({
                "founders": [],
                "totalEmployees": 0,
                "keyHires": [],
                "advisors": [],
                "confidence": FALLBACK_CONFIDENCE
            }),
            Self::Market => json!({
                "marketInfo": {
                    "tam": 0,
                    "sam": 0,
                    "som": 0,
                    "marketGrowthRate": 0,
                    "competitors": [],
                    "marketPosition": "Unknown"
                },
                "confidence": FALLBACK_CONFIDENCE
            }),
            Self::Risk => json!({
                "riskFlags": [{
                    "id": "parse-error",
                    "type": "technical",
                    "severity": "low",
                    "title": "Analysis Parsing Error",
                    "description": "Could not parse AI response",
                    "evidence": ["Response parsing failed"],
                    "confidence": FALLBACK_CONFIDENCE,
                    "impact": "Limited analysis available",
                    "recommendation": "Retry analysis with different document"
                }],
                "confidence": FALLBACK_CONFIDENCE
            }),
            Self::Recommendation => json!({
                "recommendation": {
                    "decision": "hold",
                    "score": 50,
                    "reasoning": ["Insufficient data for recommendation"],
                    "keyStrengths": [],
                    "keyWeaknesses": [],
                    "investmentThesis": "Unable to generate recommendation due to parsing error",
                    "suggestedValuation": 0,
                    "suggestedCheck": 0,
                    "nextSteps": ["Retry analysis", "Provide clearer documentation"]
                },
                "confidence": FALLBACK_CONFIDENCE
            }),
        }
    }
}

impl std::fmt::Display for AnalysisCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fallback for a category name outside the known set.
pub fn unknown_fallback() -> Value {
    json!({ "confidence": FALLBACK_CONFIDENCE })
}

const COMPANY_SCHEMA: &str = r#"
Extract company information and return ONLY valid JSON with this exact structure:
{
  "companyInfo": {
    "name": "string",
    "tagline": "string",
    "description": "string",
    "website": "string",
    "location": "string",
    "founded": "string",
    "industry": "string",
    "businessModel": "string"
  },
  "confidence": 85
}"#;

const FINANCIAL_SCHEMA: &str = r#"
Extract financial information and return ONLY valid JSON with this exact structure:
{
  "financialMetrics": {
    "currentRevenue": 0,
    "revenueGrowthRate": 0,
    "grossMargin": 0,
    "burnRate": 0,
    "runway": 0,
    "cashRaised": 0,
    "valuation": 0,
    "employees": 0,
    "customers": 0,
    "arr": 0,
    "mrr": 0
  },
  "unitEconomics": {
    "cac": 0,
    "ltv": 0,
    "paybackPeriod": 0,
    "churnRate": 0
  },
  "confidence": 85
}"#;

const TEAM_SCHEMA: &str = r#"
Extract team information and return ONLY valid JSON with this exact structure:
{
  "founders": [
    {
      "name": "string",
      "role": "string",
      "background": "string",
      "previousCompanies": ["string"],
      "education": "string",
      "yearsExperience": 0
    }
  ],
  "totalEmployees": 0,
  "keyHires": [
    {
      "name": "string",
      "role": "string",
      "background": "string"
    }
  ],
  "advisors": [
    {
      "name": "string",
      "background": "string"
    }
  ],
  "confidence": 85
}"#;

const MARKET_SCHEMA: &str = r#"
Extract market information and return ONLY valid JSON with this exact structure:
{
  "marketInfo": {
    "tam": 0,
    "sam": 0,
    "som": 0,
    "marketGrowthRate": 0,
    "competitors": ["string"],
    "marketPosition": "string"
  },
  "confidence": 85
}"#;

const RISK_SCHEMA: &str = r#"
Identify risks and return ONLY valid JSON with this exact structure:
{
  "riskFlags": [
    {
      "id": "string",
      "type": "market",
      "severity": "medium",
      "title": "string",
      "description": "string",
      "evidence": ["string"],
      "confidence": 85,
      "impact": "string",
      "recommendation": "string"
    }
  ],
  "confidence": 85
}"#;

const RECOMMENDATION_SCHEMA: &str = r#"
Provide investment recommendation and return ONLY valid JSON with this exact structure:
{
  "recommendation": {
    "decision": "buy",
    "score": 75,
    "reasoning": ["string"],
    "keyStrengths": ["string"],
    "keyWeaknesses": ["string"],
    "investmentThesis": "string",
    "suggestedValuation": 0,
    "suggestedCheck": 0,
    "nextSteps": ["string"]
  },
  "confidence": 85
}"#;
