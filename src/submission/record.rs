use crate::card::model::CardFields;
use crate::foundation::error::{ReactionError, ReactionResult};

/// One judged run as published by the contest overlay, reduced to what a reaction needs.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmissionRecord {
    pub fields: CardFields,
    pub logo_url: String,
    pub webcam_url: String,
    /// Absent when the run only carries one reaction video.
    pub screen_url: Option<String>,
}

mod wire {
    #[derive(serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct Run {
        pub(super) team: Team,
        pub(super) problem: Problem,
        pub(super) time: f64,
        pub(super) result: RunResult,
        #[serde(default)]
        pub(super) reaction_videos: Vec<Video>,
    }

    #[derive(serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct Team {
        pub(super) display_name: String,
        pub(super) custom_fields: CustomFields,
        pub(super) hash_tag: String,
        pub(super) rank_before: u32,
        pub(super) rank_after: u32,
        pub(super) organization: Organization,
    }

    #[derive(serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct CustomFields {
        pub(super) clics_team_full_name: String,
    }

    #[derive(serde::Deserialize)]
    pub(super) struct Organization {
        pub(super) logo: Media,
    }

    #[derive(serde::Deserialize)]
    pub(super) struct Media {
        pub(super) url: String,
    }

    #[derive(serde::Deserialize)]
    pub(super) struct Problem {
        pub(super) letter: String,
    }

    #[derive(serde::Deserialize)]
    pub(super) struct RunResult {
        pub(super) verdict: Verdict,
    }

    #[derive(serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct Verdict {
        pub(super) short_name: String,
        pub(super) is_accepted: bool,
    }

    pub(super) type Video = Media;
}

impl SubmissionRecord {
    /// Map an `externalRun` overlay payload.
    pub fn from_overlay_json(bytes: &[u8]) -> ReactionResult<Self> {
        let run: wire::Run = serde_json::from_slice(bytes)
            .map_err(|e| ReactionError::serde(format!("invalid overlay run: {e}")))?;
        let mut videos = run.reaction_videos.into_iter().map(|v| v.url);
        let webcam_url = videos
            .next()
            .ok_or_else(|| ReactionError::serde("overlay run has no reaction videos"))?;
        let screen_url = videos.next();

        let fields = CardFields {
            title: run.team.display_name,
            subtitle: run.team.custom_fields.clics_team_full_name,
            hashtag: run.team.hash_tag,
            task: run.problem.letter,
            outcome: run.result.verdict.short_name,
            success: run.result.verdict.is_accepted,
            time_ms: run.time,
            rank_before: run.team.rank_before,
            rank_after: run.team.rank_after,
        };
        fields.validate()?;
        Ok(Self {
            fields,
            logo_url: run.team.organization.logo.url,
            webcam_url,
            screen_url,
        })
    }

    pub fn to_card_fields(&self) -> CardFields {
        self.fields.clone()
    }

    /// Same record with `user:pass@` credentials injected into every URL.
    pub fn with_cds_auth(mut self, auth: Option<&str>) -> Self {
        self.logo_url = apply_cds_auth(&self.logo_url, auth);
        self.webcam_url = apply_cds_auth(&self.webcam_url, auth);
        self.screen_url = self.screen_url.map(|u| apply_cds_auth(&u, auth));
        self
    }
}

/// Inject `auth@` after the scheme of `http`/`https` URLs. Other sources are returned unchanged.
pub fn apply_cds_auth(url: &str, auth: Option<&str>) -> String {
    let Some(auth) = auth.filter(|a| !a.is_empty()) else {
        return url.to_owned();
    };
    for scheme in ["http://", "https://"] {
        if let Some(rest) = url.strip_prefix(scheme) {
            return format!("{scheme}{auth}@{rest}");
        }
    }
    url.to_owned()
}

#[cfg(test)]
#[path = "../../tests/unit/submission/record.rs"]
mod tests;
