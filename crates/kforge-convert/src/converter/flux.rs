//! Flux conversions

use kforge_common::{ResourceKind, Result};
use kforge_resources::flux::*;

use super::{apply_labels, converted, non_empty, Converter};
use crate::config::{
    GitRepositoryConfig, HelmReleaseConfig, HelmRepositoryConfig, KustomizationConfig,
    OciRepositoryConfig,
};

/// Build a source reference, defaulting the kind and leaving the namespace
/// unset when empty.
fn source_ref(
    kind: &str,
    default_kind: ResourceKind,
    name: &str,
    namespace: &str,
) -> CrossNamespaceSourceReference {
    let kind = non_empty(kind).unwrap_or(default_kind.kind_str());
    let reference = CrossNamespaceSourceReference::new(kind, name);
    match non_empty(namespace) {
        Some(namespace) => reference.in_namespace(namespace),
        None => reference,
    }
}

/// Apply the timeout and suspend flag shared by all Flux kinds.
fn apply_reconcile_options<K: Reconciled>(
    converter: &Converter,
    record: &mut K,
    timeout: &str,
    suspend: bool,
) -> Result<()> {
    if let Some(timeout) = converter.optional_duration(K::RESOURCE_KIND, "timeout", timeout)? {
        set_timeout(Some(&mut *record), timeout)?;
    }
    if suspend {
        set_suspend(Some(&mut *record), true)?;
    }
    Ok(())
}

impl Converter {
    /// Convert a GitRepository declaration
    pub fn git_repository(
        &self,
        cfg: Option<&GitRepositoryConfig>,
    ) -> Result<Option<GitRepository>> {
        cfg.map(|cfg| self.build_git_repository(cfg)).transpose()
    }

    /// Convert a HelmRepository declaration
    pub fn helm_repository(
        &self,
        cfg: Option<&HelmRepositoryConfig>,
    ) -> Result<Option<HelmRepository>> {
        cfg.map(|cfg| self.build_helm_repository(cfg)).transpose()
    }

    /// Convert an OCIRepository declaration
    pub fn oci_repository(
        &self,
        cfg: Option<&OciRepositoryConfig>,
    ) -> Result<Option<OCIRepository>> {
        cfg.map(|cfg| self.build_oci_repository(cfg)).transpose()
    }

    /// Convert a Kustomization declaration
    pub fn kustomization(
        &self,
        cfg: Option<&KustomizationConfig>,
    ) -> Result<Option<Kustomization>> {
        cfg.map(|cfg| self.build_kustomization(cfg)).transpose()
    }

    /// Convert a HelmRelease declaration
    pub fn helm_release(&self, cfg: Option<&HelmReleaseConfig>) -> Result<Option<HelmRelease>> {
        cfg.map(|cfg| self.build_helm_release(cfg)).transpose()
    }

    pub(crate) fn build_git_repository(&self, cfg: &GitRepositoryConfig) -> Result<GitRepository> {
        let interval = self.interval(ResourceKind::GitRepository, "interval", &cfg.interval)?;
        let mut repo = create_git_repository(
            &cfg.name,
            &cfg.namespace,
            GitRepositorySpec {
                url: cfg.url.clone(),
                interval,
                ..Default::default()
            },
        );

        if let Some(branch) = non_empty(&cfg.branch) {
            set_git_repository_branch(Some(&mut repo), branch)?;
        }
        if let Some(tag) = non_empty(&cfg.tag) {
            set_git_repository_tag(Some(&mut repo), tag)?;
        }
        if let Some(semver) = non_empty(&cfg.semver) {
            set_git_repository_semver(Some(&mut repo), semver)?;
        }
        if let Some(commit) = non_empty(&cfg.commit) {
            set_git_repository_commit(Some(&mut repo), commit)?;
        }
        if let Some(secret) = non_empty(&cfg.secret_name) {
            set_git_repository_secret_ref(Some(&mut repo), secret)?;
        }
        if let Some(ignore) = non_empty(&cfg.ignore) {
            set_git_repository_ignore(Some(&mut repo), ignore)?;
        }
        apply_reconcile_options(self, &mut repo, &cfg.timeout, cfg.suspend)?;
        apply_labels(&mut repo, &cfg.labels)?;

        converted(&repo);
        Ok(repo)
    }

    pub(crate) fn build_helm_repository(
        &self,
        cfg: &HelmRepositoryConfig,
    ) -> Result<HelmRepository> {
        let interval = self.interval(ResourceKind::HelmRepository, "interval", &cfg.interval)?;
        let mut repo = create_helm_repository(
            &cfg.name,
            &cfg.namespace,
            HelmRepositorySpec {
                url: cfg.url.clone(),
                interval,
                ..Default::default()
            },
        );

        if let Some(repo_type) = non_empty(&cfg.repo_type) {
            set_helm_repository_type(Some(&mut repo), repo_type)?;
        }
        if let Some(secret) = non_empty(&cfg.secret_name) {
            set_helm_repository_secret_ref(Some(&mut repo), secret)?;
        }
        if cfg.pass_credentials {
            set_helm_repository_pass_credentials(Some(&mut repo), true)?;
        }
        apply_reconcile_options(self, &mut repo, &cfg.timeout, cfg.suspend)?;
        apply_labels(&mut repo, &cfg.labels)?;

        converted(&repo);
        Ok(repo)
    }

    pub(crate) fn build_oci_repository(&self, cfg: &OciRepositoryConfig) -> Result<OCIRepository> {
        let interval = self.interval(ResourceKind::OciRepository, "interval", &cfg.interval)?;
        let mut repo = create_oci_repository(
            &cfg.name,
            &cfg.namespace,
            OCIRepositorySpec {
                url: cfg.url.clone(),
                interval,
                ..Default::default()
            },
        );

        if let Some(tag) = non_empty(&cfg.tag) {
            set_oci_repository_tag(Some(&mut repo), tag)?;
        }
        if let Some(semver) = non_empty(&cfg.semver) {
            set_oci_repository_semver(Some(&mut repo), semver)?;
        }
        if let Some(digest) = non_empty(&cfg.digest) {
            set_oci_repository_digest(Some(&mut repo), digest)?;
        }
        if let Some(secret) = non_empty(&cfg.secret_name) {
            set_oci_repository_secret_ref(Some(&mut repo), secret)?;
        }
        if let Some(provider) = non_empty(&cfg.provider) {
            set_oci_repository_provider(Some(&mut repo), provider)?;
        }
        if cfg.insecure {
            set_oci_repository_insecure(Some(&mut repo), true)?;
        }
        apply_reconcile_options(self, &mut repo, &cfg.timeout, cfg.suspend)?;
        apply_labels(&mut repo, &cfg.labels)?;

        converted(&repo);
        Ok(repo)
    }

    pub(crate) fn build_kustomization(&self, cfg: &KustomizationConfig) -> Result<Kustomization> {
        let kind = ResourceKind::Kustomization;
        let interval = self.interval(kind, "interval", &cfg.interval)?;
        let mut ks = create_kustomization(
            &cfg.name,
            &cfg.namespace,
            KustomizationSpec {
                source_ref: source_ref(
                    &cfg.source_kind,
                    ResourceKind::GitRepository,
                    &cfg.source_name,
                    &cfg.source_namespace,
                ),
                prune: cfg.prune,
                interval,
                ..Default::default()
            },
        );

        if let Some(path) = non_empty(&cfg.path) {
            set_kustomization_path(Some(&mut ks), path)?;
        }
        if let Some(retry) = self.optional_duration(kind, "retryInterval", &cfg.retry_interval)? {
            set_kustomization_retry_interval(Some(&mut ks), retry)?;
        }
        if cfg.wait {
            set_kustomization_wait(Some(&mut ks), true)?;
        }
        if let Some(namespace) = non_empty(&cfg.target_namespace) {
            set_kustomization_target_namespace(Some(&mut ks), namespace)?;
        }
        for dependency in &cfg.depends_on {
            add_kustomization_dependency(
                Some(&mut ks),
                Some(DependencyReference::new(dependency)),
            )?;
        }
        for (key, value) in &cfg.substitute {
            add_kustomization_substitute(Some(&mut ks), key.as_str(), value.as_str())?;
        }
        apply_reconcile_options(self, &mut ks, &cfg.timeout, cfg.suspend)?;
        apply_labels(&mut ks, &cfg.labels)?;

        converted(&ks);
        Ok(ks)
    }

    pub(crate) fn build_helm_release(&self, cfg: &HelmReleaseConfig) -> Result<HelmRelease> {
        let interval = self.interval(ResourceKind::HelmRelease, "interval", &cfg.interval)?;
        let mut release = create_helm_release(
            &cfg.name,
            &cfg.namespace,
            HelmReleaseSpec {
                interval,
                ..Default::default()
            },
        );

        set_helm_release_chart(Some(&mut release), cfg.chart.as_str())?;
        set_helm_release_source_ref(
            Some(&mut release),
            Some(source_ref(
                &cfg.source_kind,
                ResourceKind::HelmRepository,
                &cfg.source_name,
                &cfg.source_namespace,
            )),
        )?;
        if let Some(version) = non_empty(&cfg.version) {
            set_helm_release_chart_version(Some(&mut release), version)?;
        }
        if let Some(release_name) = non_empty(&cfg.release_name) {
            set_helm_release_release_name(Some(&mut release), release_name)?;
        }
        if let Some(namespace) = non_empty(&cfg.target_namespace) {
            set_helm_release_target_namespace(Some(&mut release), namespace)?;
        }
        if cfg.create_namespace {
            set_helm_release_create_namespace(Some(&mut release), true)?;
        }
        for dependency in &cfg.depends_on {
            add_helm_release_dependency(
                Some(&mut release),
                Some(DependencyReference::new(dependency)),
            )?;
        }
        if let Some(values) = &cfg.values {
            set_helm_release_values(Some(&mut release), Some(values.clone()))?;
        }
        apply_reconcile_options(self, &mut release, &cfg.timeout, cfg.suspend)?;
        apply_labels(&mut release, &cfg.labels)?;

        converted(&release);
        Ok(release)
    }
}
