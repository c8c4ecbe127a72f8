//! Flux source-controller resources

use std::time::Duration;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use kforge_common::duration::{serde_duration, serde_opt_duration};
use kforge_common::{ResourceKind, Result};

use super::{impl_reconciled, LocalObjectReference};
use crate::builder;

// =============================================================================
// GitRepository
// =============================================================================

/// Flux GitRepository specification
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "source.toolkit.fluxcd.io",
    version = "v1",
    kind = "GitRepository",
    namespaced,
    derive = "PartialEq",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct GitRepositorySpec {
    /// Repository URL (https:// or ssh://)
    pub url: String,

    /// Git reference to check out
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "ref")]
    pub reference: Option<GitRepositoryRef>,

    /// Secret with SSH or HTTPS credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<LocalObjectReference>,

    /// How often the repository is fetched
    #[serde(with = "serde_duration")]
    #[schemars(with = "String")]
    pub interval: Duration,

    /// Timeout for git operations
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_opt_duration")]
    #[schemars(with = "Option<String>")]
    pub timeout: Option<Duration>,

    /// Suspend fetching
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspend: Option<bool>,

    /// .gitignore-style exclusions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore: Option<String>,

    /// Initialize and fetch submodules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurse_submodules: Option<bool>,

    /// Other GitRepositories whose contents are copied into this artifact
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<GitRepositoryInclude>,
}

/// Git reference; the most specific field set wins
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct GitRepositoryRef {
    /// Branch name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Tag name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// SemVer range matched against tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semver: Option<String>,
    /// Commit SHA
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

/// Include another GitRepository's artifact
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GitRepositoryInclude {
    /// The GitRepository to include
    pub repository: LocalObjectReference,
    /// Path within the included repository
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_path: Option<String>,
    /// Destination path within this artifact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_path: Option<String>,
}

impl_buildable!(GitRepository, GitRepositorySpec, ResourceKind::GitRepository);
impl_reconciled!(GitRepository);

/// Create a GitRepository
pub fn create_git_repository(
    name: &str,
    namespace: &str,
    spec: GitRepositorySpec,
) -> GitRepository {
    builder::create(name, Some(namespace), spec)
}

/// Set the repository URL
pub fn set_git_repository_url(
    target: Option<&mut GitRepository>,
    url: impl Into<String>,
) -> Result<()> {
    builder::set(target, |r| &mut r.spec.url, url.into())
}

fn git_ref(repo: &mut GitRepository) -> &mut GitRepositoryRef {
    repo.spec.reference.get_or_insert_with(Default::default)
}

/// Track a branch
pub fn set_git_repository_branch(
    target: Option<&mut GitRepository>,
    branch: impl Into<String>,
) -> Result<()> {
    builder::set_some(target, |r| &mut git_ref(r).branch, branch.into())
}

/// Pin to a tag
pub fn set_git_repository_tag(
    target: Option<&mut GitRepository>,
    tag: impl Into<String>,
) -> Result<()> {
    builder::set_some(target, |r| &mut git_ref(r).tag, tag.into())
}

/// Follow a SemVer range
pub fn set_git_repository_semver(
    target: Option<&mut GitRepository>,
    semver: impl Into<String>,
) -> Result<()> {
    builder::set_some(target, |r| &mut git_ref(r).semver, semver.into())
}

/// Pin to a commit
pub fn set_git_repository_commit(
    target: Option<&mut GitRepository>,
    commit: impl Into<String>,
) -> Result<()> {
    builder::set_some(target, |r| &mut git_ref(r).commit, commit.into())
}

/// Use credentials from a Secret
pub fn set_git_repository_secret_ref(
    target: Option<&mut GitRepository>,
    secret_name: impl Into<String>,
) -> Result<()> {
    let secret = LocalObjectReference::new(secret_name);
    builder::set_some(target, |r| &mut r.spec.secret_ref, secret)
}

/// Set .gitignore-style exclusions
pub fn set_git_repository_ignore(
    target: Option<&mut GitRepository>,
    ignore: impl Into<String>,
) -> Result<()> {
    builder::set_some(target, |r| &mut r.spec.ignore, ignore.into())
}

/// Enable or disable submodule checkout
pub fn set_git_repository_recurse_submodules(
    target: Option<&mut GitRepository>,
    recurse: bool,
) -> Result<()> {
    builder::set_some(target, |r| &mut r.spec.recurse_submodules, recurse)
}

/// Include another repository's artifact
pub fn add_git_repository_include(
    target: Option<&mut GitRepository>,
    include: Option<GitRepositoryInclude>,
) -> Result<()> {
    builder::push_required(target, "include", |r| &mut r.spec.include, include)
}

// =============================================================================
// HelmRepository
// =============================================================================

/// Flux HelmRepository specification
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "source.toolkit.fluxcd.io",
    version = "v1",
    kind = "HelmRepository",
    namespaced,
    derive = "PartialEq",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct HelmRepositorySpec {
    /// Repository URL (https:// or oci://)
    pub url: String,

    /// Repository type: "default" or "oci"
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "type")]
    pub type_: Option<String>,

    /// Secret with repository credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<LocalObjectReference>,

    /// Pass credentials to chart downloads on other hosts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_credentials: Option<bool>,

    /// OIDC provider for OCI repositories (aws, azure, gcp, generic)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// How often the index is fetched
    #[serde(with = "serde_duration")]
    #[schemars(with = "String")]
    pub interval: Duration,

    /// Timeout for index downloads
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_opt_duration")]
    #[schemars(with = "Option<String>")]
    pub timeout: Option<Duration>,

    /// Suspend fetching
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspend: Option<bool>,
}

impl_buildable!(HelmRepository, HelmRepositorySpec, ResourceKind::HelmRepository);
impl_reconciled!(HelmRepository);

/// Create a HelmRepository
pub fn create_helm_repository(
    name: &str,
    namespace: &str,
    spec: HelmRepositorySpec,
) -> HelmRepository {
    builder::create(name, Some(namespace), spec)
}

/// Set the repository URL
pub fn set_helm_repository_url(
    target: Option<&mut HelmRepository>,
    url: impl Into<String>,
) -> Result<()> {
    builder::set(target, |r| &mut r.spec.url, url.into())
}

/// Set the repository type ("default" or "oci")
pub fn set_helm_repository_type(
    target: Option<&mut HelmRepository>,
    repo_type: impl Into<String>,
) -> Result<()> {
    builder::set_some(target, |r| &mut r.spec.type_, repo_type.into())
}

/// Use credentials from a Secret
pub fn set_helm_repository_secret_ref(
    target: Option<&mut HelmRepository>,
    secret_name: impl Into<String>,
) -> Result<()> {
    let secret = LocalObjectReference::new(secret_name);
    builder::set_some(target, |r| &mut r.spec.secret_ref, secret)
}

/// Forward credentials to chart hosts
pub fn set_helm_repository_pass_credentials(
    target: Option<&mut HelmRepository>,
    pass: bool,
) -> Result<()> {
    builder::set_some(target, |r| &mut r.spec.pass_credentials, pass)
}

/// Set the OIDC provider
pub fn set_helm_repository_provider(
    target: Option<&mut HelmRepository>,
    provider: impl Into<String>,
) -> Result<()> {
    builder::set_some(target, |r| &mut r.spec.provider, provider.into())
}

// =============================================================================
// OCIRepository
// =============================================================================

/// Flux OCIRepository specification
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "source.toolkit.fluxcd.io",
    version = "v1beta2",
    kind = "OCIRepository",
    namespaced,
    derive = "PartialEq",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct OCIRepositorySpec {
    /// Artifact URL (oci://)
    pub url: String,

    /// OCI reference to pull
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "ref")]
    pub reference: Option<OciRepositoryRef>,

    /// Secret with registry credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<LocalObjectReference>,

    /// OIDC provider (aws, azure, gcp, generic)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Allow plain HTTP registries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// .gitignore-style exclusions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore: Option<String>,

    /// How often the artifact is pulled
    #[serde(with = "serde_duration")]
    #[schemars(with = "String")]
    pub interval: Duration,

    /// Timeout for pulls
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_opt_duration")]
    #[schemars(with = "Option<String>")]
    pub timeout: Option<Duration>,

    /// Suspend pulling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspend: Option<bool>,
}

/// OCI reference; digest wins over semver, semver over tag
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct OciRepositoryRef {
    /// Image tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// SemVer range matched against tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semver: Option<String>,
    /// Image digest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl_buildable!(OCIRepository, OCIRepositorySpec, ResourceKind::OciRepository);
impl_reconciled!(OCIRepository);

/// Create an OCIRepository
pub fn create_oci_repository(
    name: &str,
    namespace: &str,
    spec: OCIRepositorySpec,
) -> OCIRepository {
    builder::create(name, Some(namespace), spec)
}

/// Set the artifact URL
pub fn set_oci_repository_url(
    target: Option<&mut OCIRepository>,
    url: impl Into<String>,
) -> Result<()> {
    builder::set(target, |r| &mut r.spec.url, url.into())
}

fn oci_ref(repo: &mut OCIRepository) -> &mut OciRepositoryRef {
    repo.spec.reference.get_or_insert_with(Default::default)
}

/// Pull a tag
pub fn set_oci_repository_tag(
    target: Option<&mut OCIRepository>,
    tag: impl Into<String>,
) -> Result<()> {
    builder::set_some(target, |r| &mut oci_ref(r).tag, tag.into())
}

/// Follow a SemVer range
pub fn set_oci_repository_semver(
    target: Option<&mut OCIRepository>,
    semver: impl Into<String>,
) -> Result<()> {
    builder::set_some(target, |r| &mut oci_ref(r).semver, semver.into())
}

/// Pin to a digest
pub fn set_oci_repository_digest(
    target: Option<&mut OCIRepository>,
    digest: impl Into<String>,
) -> Result<()> {
    builder::set_some(target, |r| &mut oci_ref(r).digest, digest.into())
}

/// Use credentials from a Secret
pub fn set_oci_repository_secret_ref(
    target: Option<&mut OCIRepository>,
    secret_name: impl Into<String>,
) -> Result<()> {
    let secret = LocalObjectReference::new(secret_name);
    builder::set_some(target, |r| &mut r.spec.secret_ref, secret)
}

/// Allow plain HTTP
pub fn set_oci_repository_insecure(
    target: Option<&mut OCIRepository>,
    insecure: bool,
) -> Result<()> {
    builder::set_some(target, |r| &mut r.spec.insecure, insecure)
}

/// Set the OIDC provider
pub fn set_oci_repository_provider(
    target: Option<&mut OCIRepository>,
    provider: impl Into<String>,
) -> Result<()> {
    builder::set_some(target, |r| &mut r.spec.provider, provider.into())
}
