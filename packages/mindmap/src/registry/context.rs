//! Per-conversion state passed to every codec call.

use std::collections::BTreeSet;
use std::fmt;

use crate::config::ConverterOptions;
use crate::diagnostics::{Diagnostic, Diagnostics, UnregisteredTags};
use crate::error::{Result, TranscodeError};

/// State owned by one `decode` or `encode` call.
///
/// Every call gets a fresh context, so concurrent conversions through the
/// same registry never share diagnostics.
pub struct ConversionContext {
    diagnostics: Diagnostics,
    unregistered: UnregisteredTags,
    options: ConverterOptions,
    fatal: Option<TranscodeError>,
}

impl ConversionContext {
    #[must_use]
    pub fn new(options: ConverterOptions) -> Self {
        Self {
            diagnostics: Diagnostics::new(),
            unregistered: UnregisteredTags::new(),
            options,
            fatal: None,
        }
    }

    #[must_use]
    pub fn options(&self) -> ConverterOptions {
        self.options
    }

    /// Record a non-fatal diagnostic.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Remember that `tag` went through the default codec.
    pub fn record_unregistered(&mut self, tag: &str) {
        if self.unregistered.record(tag) {
            tracing::trace!(tag = %tag, "no codec registered");
        }
    }

    /// Report a value of the wrong abstraction.
    ///
    /// In strict mode the first misuse also becomes the fatal error of the
    /// conversion.
    pub fn misuse(&mut self, tag: &str, message: impl Into<String>) {
        let message = message.into();
        self.diagnostics.push(Diagnostic::ApiMisuse {
            tag: tag.to_string(),
            message: message.clone(),
        });
        if self.options.strict && self.fatal.is_none() {
            self.fatal = Some(TranscodeError::ApiMisuse {
                tag: tag.to_string(),
                message,
            });
        }
    }

    /// Fail with the pending fatal error, if any.
    pub(crate) fn check_fatal(&mut self) -> Result<()> {
        match self.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Take the tags seen without a codec so far.
    pub fn drain_unregistered(&mut self) -> BTreeSet<String> {
        self.unregistered.drain()
    }

    /// Close the conversion: turn the unregistered tags into one diagnostic
    /// per tag and hand back everything that was collected.
    #[must_use]
    pub fn into_diagnostics(mut self) -> Diagnostics {
        let tags = self.drain_unregistered();
        if !tags.is_empty() {
            tracing::warn!(
                tags = ?tags,
                "Elements without a specific codec were converted with the default codec"
            );
        }
        for tag in tags {
            self.diagnostics.push(Diagnostic::UnregisteredCodec { tag });
        }
        self.diagnostics
    }
}

impl fmt::Debug for ConversionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionContext")
            .field("diagnostics", &self.diagnostics.len())
            .field("options", &self.options)
            .field("has_fatal", &self.fatal.is_some())
            .finish_non_exhaustive()
    }
}
