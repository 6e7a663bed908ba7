//! Access policy evaluation
//!
//! Runs before any filesystem access so that a refusal never depends on
//! whether a file exists.

use super::outcome::ForbiddenReason;
use super::path::NormalizedPath;
use crate::config::{PolicyConfig, PolicyRule, RuleAction};
use crate::error::RootError;
use glob::{MatchOptions, Pattern};

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Result of evaluating the policy for one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyVerdict {
    Allow,
    Deny(ForbiddenReason),
}

#[derive(Debug, Clone)]
enum RuleMatcher {
    Exact(NormalizedPath),
    Prefix(NormalizedPath),
    Glob(Pattern),
    Any,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    action: RuleAction,
    matcher: RuleMatcher,
    label: String,
}

/// Immutable, compiled access policy
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    deny_hidden: bool,
    rules: Vec<CompiledRule>,
}

impl AccessPolicy {
    /// Compile the configured rules
    pub fn from_config(config: &PolicyConfig) -> Result<Self, RootError> {
        let rules = config
            .rules
            .iter()
            .map(compile_rule)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            deny_hidden: config.deny_hidden,
            rules,
        })
    }

    /// Evaluate the hidden-segment rule, then the ordered rules (first match wins)
    pub fn evaluate(&self, path: &NormalizedPath) -> PolicyVerdict {
        if self.deny_hidden && path.segments().iter().any(|s| s.starts_with('.')) {
            return PolicyVerdict::Deny(ForbiddenReason::HiddenSegment);
        }

        let Some(rule) = self.rules.iter().find(|rule| rule.matches(path)) else {
            return PolicyVerdict::Allow;
        };

        match rule.action {
            RuleAction::Allow => PolicyVerdict::Allow,
            RuleAction::Deny => {
                PolicyVerdict::Deny(ForbiddenReason::DeniedByRule(rule.label.clone()))
            }
        }
    }
}

impl CompiledRule {
    fn matches(&self, path: &NormalizedPath) -> bool {
        match &self.matcher {
            RuleMatcher::Exact(exact) => path == exact,
            RuleMatcher::Prefix(prefix) => path.starts_with(prefix),
            RuleMatcher::Glob(pattern) => {
                let url = path.to_string();
                pattern.matches_with(url.trim_start_matches('/'), GLOB_OPTIONS)
            }
            RuleMatcher::Any => true,
        }
    }
}

/// Exact path takes priority, then prefix, then glob; none matches everything
fn compile_rule(rule: &PolicyRule) -> Result<CompiledRule, RootError> {
    let invalid = |p: &str| RootError::InvalidPrefix(p.to_string());

    let (matcher, label) = if let Some(path) = &rule.path {
        let exact = NormalizedPath::parse(path).map_err(|_| invalid(path))?;
        (RuleMatcher::Exact(exact), path.clone())
    } else if let Some(prefix) = &rule.prefix {
        let prefix_path = NormalizedPath::parse(prefix).map_err(|_| invalid(prefix))?;
        (RuleMatcher::Prefix(prefix_path), prefix.clone())
    } else if let Some(glob) = &rule.glob {
        let pattern =
            Pattern::new(glob.trim_start_matches('/')).map_err(|source| RootError::InvalidPattern {
                pattern: glob.clone(),
                source,
            })?;
        (RuleMatcher::Glob(pattern), glob.clone())
    } else {
        (RuleMatcher::Any, "*".to_string())
    };

    Ok(CompiledRule {
        action: rule.action,
        matcher,
        label,
    })
}
