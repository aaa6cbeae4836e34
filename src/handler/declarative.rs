//! Handlers defined in configuration.
//!
//! Each `[[handlers]]` entry becomes a [`RestHandler`] whose resolver replays
//! the configured status, headers, cookies, body and delay.

use std::sync::Arc;

use regex::Regex;

use crate::config::validation::validate_config;
use crate::config::{ConfigError, HandlerConfig, MockConfig, ValidationError};
use crate::error::MockError;
use crate::handler::{resolver, HandlerMethod, Rest, RestHandler};
use crate::http::{Context, DelayMode, MockResponse, ResponseComposer};
use crate::routing::Mask;

/// Build every configured handler, in declaration order.
pub fn build_handlers(rest: &Rest, config: &MockConfig) -> Result<Vec<RestHandler>, ConfigError> {
    validate_config(config).map_err(ConfigError::Validation)?;

    config
        .handlers
        .iter()
        .enumerate()
        .map(|(index, handler)| build_handler(rest, index, handler))
        .collect()
}

fn build_handler(rest: &Rest, index: usize, entry: &HandlerConfig) -> Result<RestHandler, ConfigError> {
    let label = entry.label(index);
    let method: HandlerMethod = entry.method.parse().map_err(|_| {
        ConfigError::Validation(vec![ValidationError::Method {
            handler: label.clone(),
            method: entry.method.clone(),
        }])
    })?;
    let mask = if entry.regex {
        let re = Regex::new(&entry.mask).map_err(|e| {
            ConfigError::Validation(vec![ValidationError::Regex {
                handler: label.clone(),
                reason: e.to_string(),
            }])
        })?;
        Mask::Pattern(re)
    } else {
        Mask::Exact(entry.mask.clone())
    };

    let shared = Arc::new(entry.clone());
    let resolve = resolver(move |_req, res, ctx| {
        let entry = shared.clone();
        async move { Ok(respond(&entry, res, &ctx)?) }
    });

    Ok(rest.build(method, mask, resolve, Some(label)))
}

fn respond(entry: &HandlerConfig, res: ResponseComposer, ctx: &Context) -> Result<MockResponse, MockError> {
    let res = if entry.once { res.once() } else { res };

    let mut transforms = vec![match &entry.status_text {
        Some(text) => ctx.status_text(entry.status, text.clone()),
        None => ctx.status(entry.status),
    }];
    if let Some(text) = &entry.text {
        transforms.push(ctx.text(text.clone()));
    }
    if let Some(json) = &entry.json {
        transforms.push(ctx.json(json)?);
    }
    if let Some(xml) = &entry.xml {
        transforms.push(ctx.xml(xml.clone()));
    }
    if let Some(body) = &entry.body {
        transforms.push(ctx.body(body.clone()));
    }
    // Explicit headers win over the content type a body kind sets.
    transforms.extend(entry.headers.iter().map(|(k, v)| ctx.set(k.clone(), v.clone())));
    transforms.extend(entry.cookies.iter().map(|(k, v)| ctx.cookie(k.clone(), v.clone())));
    if let Some(mode) = entry.delay.as_deref().and_then(|d| d.parse::<DelayMode>().ok()) {
        transforms.push(ctx.delay(mode));
    }

    res.compose(transforms)
}
