//! Pipeline facade.
//!
//! Wires the clients and services together behind the three caller-facing
//! operations: `resolve_and_enrich`, `fetch_and_analyze`, and the
//! settings triple. Dependencies are constructed here and injected
//! explicitly; nothing in the pipeline reaches for ambient state.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::error::Error;
use crate::esi::EsiClient;
use crate::model::analysis::ActivityAnalysis;
use crate::model::entity::{EntityKind, UnifiedRecord};
use crate::model::threat::{KillboardStats, ThreatAssessment};
use crate::progress::ProgressReporter;
use crate::service::affiliation::AffiliationService;
use crate::service::analysis::{analyze_killmails, SubjectFilter};
use crate::service::builder::build_unified_records;
use crate::service::killfeed::{FeedSubscription, KillFeedService};
use crate::service::killmail::{KillmailFetchOptions, KillmailService, KillmailTimeSource};
use crate::service::org::OrgInfoService;
use crate::service::resolver::ResolverService;
use crate::service::settings::{Settings, SettingsService};
use crate::service::stats::build_killboard_stats;
use crate::service::threat::assess_threat;
use crate::service::universe::UniverseService;
use crate::zkill::ZkillClient;

/// Output of `fetch_and_analyze`: summary stats, the full activity
/// analysis, and the threat assessment derived from both.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThreatProfile {
    pub stats: KillboardStats,
    pub analysis: ActivityAnalysis,
    pub threat: ThreatAssessment,
}

pub struct Pipeline {
    config: Arc<PipelineConfig>,
    reporter: ProgressReporter,
    resolver: ResolverService,
    affiliations: AffiliationService,
    orgs: OrgInfoService,
    universe: UniverseService,
    killmails: Arc<KillmailService>,
    killfeed: KillFeedService,
    settings: Arc<SettingsService>,
}

impl Pipeline {
    /// Builds the pipeline over an already-connected database.
    pub fn new(
        db: DatabaseConnection,
        config: PipelineConfig,
        reporter: ProgressReporter,
    ) -> Result<Self, Error> {
        let config = Arc::new(config);
        let esi = Arc::new(
            EsiClient::new(&config.esi_base, &config.user_agent)?
                .with_max_retries(config.max_retries),
        );
        let zkill = Arc::new(ZkillClient::new(&config)?.with_max_retries(config.max_retries));
        let settings = Arc::new(SettingsService::new(db.clone()));
        let killmails = Arc::new(KillmailService::new(
            db.clone(),
            esi.clone(),
            config.clone(),
        ));
        let times: Arc<dyn KillmailTimeSource> = killmails.clone();

        Ok(Self {
            resolver: ResolverService::new(db.clone(), esi.clone(), config.clone()),
            affiliations: AffiliationService::new(db.clone(), esi.clone(), config.clone()),
            orgs: OrgInfoService::new(db.clone(), esi.clone(), config.clone()),
            universe: UniverseService::new(db.clone(), esi, config.clone()),
            killfeed: KillFeedService::new(db, zkill, times, settings.clone(), config.clone()),
            killmails,
            settings,
            config,
            reporter,
        })
    }

    /// Resolves raw name queries into enriched unified records.
    pub async fn resolve_and_enrich(&self, names: &[String]) -> Result<Vec<UnifiedRecord>, Error> {
        let resolved = self.resolver.resolve_names(names, &self.reporter).await?;
        if resolved.is_empty() {
            return Ok(Vec::new());
        }

        let character_ids: Vec<i64> = resolved.characters.iter().map(|c| c.id).collect();
        let affiliations = self
            .affiliations
            .get_affiliations(&character_ids, &self.reporter)
            .await?;

        let mut corporation_ids: Vec<i64> =
            affiliations.values().map(|a| a.corporation_id).collect();
        corporation_ids.extend(resolved.corporations.iter().map(|c| c.id));

        let mut alliance_ids: Vec<i64> =
            affiliations.values().filter_map(|a| a.alliance_id).collect();
        alliance_ids.extend(resolved.alliances.iter().map(|a| a.id));

        let corporations = self
            .orgs
            .get_corporations(&corporation_ids, &self.reporter)
            .await?;
        let alliances = self.orgs.get_alliances(&alliance_ids, &self.reporter).await?;

        Ok(build_unified_records(
            &resolved,
            &affiliations,
            &corporations,
            &alliances,
            &self.reporter,
        ))
    }

    /// Retrieves and analyzes one entity's killboard activity.
    pub async fn fetch_and_analyze(
        &self,
        kind: EntityKind,
        id: i64,
    ) -> Result<ThreatProfile, Error> {
        let settings = self.settings.get_settings().await?;
        let max_killmails = settings.max_killmails_to_fetch as usize;

        let kills = self
            .killfeed
            .entity_kills_streaming(
                kind,
                id,
                FeedSubscription {
                    on_page: None,
                    on_progress: self.reporter.progress.clone(),
                    max_kills: Some(max_killmails),
                },
            )
            .await?;

        let killmails = self
            .killmails
            .fetch_killmails(
                &kills,
                &KillmailFetchOptions {
                    max_concurrency: self.config.esi_max_concurrency,
                    batch_delay: self.config.killmail_batch_delay,
                    max_killmails,
                    on_result: None,
                    progress: self.reporter.progress.clone(),
                },
            )
            .await?;

        let system_ids: Vec<i64> = killmails
            .iter()
            .map(|k| k.killmail.solar_system_id)
            .collect();
        let systems = self.universe.get_systems(&system_ids, &self.reporter).await?;

        let subject = SubjectFilter { kind, id };
        let now = Utc::now();
        let stats = build_killboard_stats(
            &kills,
            &killmails,
            &subject,
            &systems,
            now,
            self.config.recent_window_days,
        );
        let analysis = analyze_killmails(&killmails, &subject);
        let threat = assess_threat(&stats, &analysis, now);

        Ok(ThreatProfile {
            stats,
            analysis,
            threat,
        })
    }

    pub async fn get_settings(&self) -> Result<Settings, Error> {
        self.settings.get_settings().await
    }

    pub async fn set_setting(&self, key: &str, value: i64) -> Result<(), Error> {
        self.settings.set_setting(key, value).await
    }

    pub async fn reset_settings(&self) -> Result<(), Error> {
        self.settings.reset_settings().await
    }

    /// Name-resolution service, exposed for reverse lookups by the
    /// display surface.
    pub fn resolver(&self) -> &ResolverService {
        &self.resolver
    }
}
