// Dweve ESQ - Elasticsearch Query Tooling
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Dotted service versions (`7`, `7.10`, `7.10.2`).

use crate::error::{EsqError, EsqResult};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A version with one to three numeric groups.
///
/// Ordering is numeric per group; a missing group sorts before `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: Option<u64>,
    pub patch: Option<u64>,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor: Some(minor),
            patch: Some(patch),
        }
    }

    /// Parse `X[.Y[.Z]]`; anything after a `-` is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use esq_core::Version;
    ///
    /// let version = Version::parse("7.10.2-SNAPSHOT").unwrap();
    /// assert_eq!(version, Version::new(7, 10, 2));
    /// assert_eq!(Version::parse("6.8").unwrap().to_string(), "6.8");
    /// ```
    pub fn parse(text: &str) -> EsqResult<Self> {
        let core = text.trim();
        let core = core.split_once('-').map_or(core, |(head, _)| head);

        let mut groups = core.split('.');
        let major = Self::group(groups.next(), text)?
            .ok_or_else(|| EsqError::version(format!("empty version '{}'", text)))?;
        let minor = Self::group(groups.next(), text)?;
        let patch = Self::group(groups.next(), text)?;

        if groups.next().is_some() {
            return Err(EsqError::version(format!(
                "too many groups in version '{}'",
                text
            )));
        }

        Ok(Self {
            major,
            minor,
            patch,
        })
    }

    fn group(part: Option<&str>, text: &str) -> EsqResult<Option<u64>> {
        match part {
            None | Some("") => Ok(None),
            Some(part) => part.parse::<u64>().map(Some).map_err(|_| {
                EsqError::version(format!("invalid group '{}' in version '{}'", part, text))
            }),
        }
    }

    /// Number of groups present.
    pub fn groups(&self) -> usize {
        1 + usize::from(self.minor.is_some()) + usize::from(self.patch.is_some())
    }

    /// Keep at most `groups` groups.
    pub fn truncated(&self, groups: usize) -> Self {
        Self {
            major: self.major,
            minor: self.minor.filter(|_| groups >= 2),
            patch: self.patch.filter(|_| groups >= 3),
        }
    }

    /// Pick the candidate that best serves `version`.
    ///
    /// The version is compared at the precision of the candidates (the
    /// group count of the first one). An exact match wins; otherwise the
    /// next higher candidate, or the highest one when `version` is newer
    /// than all of them. Candidates that do not parse are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use esq_core::Version;
    ///
    /// let candidates = ["6.8", "7.10", "7.4"];
    /// let closest = Version::closest(&Version::new(7, 5, 1), &candidates).unwrap();
    /// assert_eq!(closest.to_string(), "7.10");
    /// ```
    pub fn closest<S: AsRef<str>>(version: &Version, candidates: &[S]) -> Option<Version> {
        let mut parsed: Vec<Version> = candidates
            .iter()
            .filter_map(|c| Version::parse(c.as_ref()).ok())
            .collect();
        let precision = parsed.first()?.groups();
        let target = version.truncated(precision);

        parsed.sort();
        if let Some(exact) = parsed.iter().find(|c| **c == target) {
            return Some(*exact);
        }

        parsed
            .iter()
            .find(|c| **c > target)
            .or_else(|| parsed.last())
            .copied()
    }
}

impl FromStr for Version {
    type Err = EsqError;

    fn from_str(s: &str) -> EsqResult<Self> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.major)?;
        if let Some(minor) = self.minor {
            write!(f, ".{}", minor)?;
            if let Some(patch) = self.patch {
                write!(f, ".{}", patch)?;
            }
        }
        Ok(())
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
