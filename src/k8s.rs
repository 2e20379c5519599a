//! Kubernetes manifest helpers: kind-ordered multi-document output and
//! manifest-derived file names.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::dumper::{self, DumpOptions};
use crate::error::Result;
use crate::value::Value;

/// Resource kinds in cluster install order. Namespaces and policy come
/// first, then configuration and storage, then RBAC, then workloads.
pub const KIND_ORDER: &[&str] = &[
    "Namespace",
    "NetworkPolicy",
    "ResourceQuota",
    "LimitRange",
    "PodSecurityPolicy",
    "PodDisruptionBudget",
    "ServiceAccount",
    "Secret",
    "SecretList",
    "ConfigMap",
    "StorageClass",
    "PersistentVolume",
    "PersistentVolumeClaim",
    "CustomResourceDefinition",
    "ClusterRole",
    "ClusterRoleList",
    "ClusterRoleBinding",
    "ClusterRoleBindingList",
    "Role",
    "RoleList",
    "RoleBinding",
    "RoleBindingList",
    "Service",
    "DaemonSet",
    "Pod",
    "ReplicationController",
    "ReplicaSet",
    "Deployment",
    "HorizontalPodAutoscaler",
    "StatefulSet",
    "Job",
    "CronJob",
    "IngressClass",
    "Ingress",
    "APIService",
];

static KIND_RANK: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    KIND_ORDER
        .iter()
        .enumerate()
        .map(|(rank, kind)| (*kind, rank))
        .collect()
});

fn kind_rank(document: &Value) -> usize {
    document
        .get("kind")
        .and_then(Value::as_str)
        .and_then(|kind| KIND_RANK.get(kind).copied())
        .unwrap_or(KIND_ORDER.len())
}

/// Stable-sorts manifests into install order. Documents with an unknown or
/// missing `kind` sort after all known kinds, keeping their relative order.
pub fn sort_manifests(documents: &mut [Value]) {
    documents.sort_by_key(kind_rank);
}

/// Dumps Kubernetes manifests as a multi-document stream in install order.
pub fn to_string_manifests(documents: &[Value]) -> Result<String> {
    to_string_manifests_with(documents, &DumpOptions::default())
}

/// Like [`to_string_manifests`] with explicit dump options.
pub fn to_string_manifests_with(documents: &[Value], options: &DumpOptions) -> Result<String> {
    let mut sorted = documents.to_vec();
    sort_manifests(&mut sorted);
    dumper::to_string_all_with(&sorted, options)
}

/// Derives a file name like `deployment-web.yaml` from a manifest's `kind`,
/// `type` and `metadata.name` fields, falling back to `<fallback>.yaml` for
/// documents without identifying fields.
pub fn manifest_filename(document: &Value, fallback: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    for &field in &["kind", "type"] {
        if let Some(text) = document.get(field).and_then(Value::as_str) {
            if !text.is_empty() {
                parts.push(text.to_lowercase());
            }
        }
    }
    if let Some(name) = document
        .get("metadata")
        .and_then(|metadata| metadata.get("name"))
        .and_then(Value::as_str)
    {
        if !name.is_empty() {
            parts.push(name.to_lowercase());
        }
    }
    if parts.is_empty() {
        format!("{}.yaml", fallback)
    } else {
        format!("{}.yaml", parts.join("-"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::from_str;

    #[test]
    fn known_kinds_rank_in_install_order() {
        let namespace = from_str("kind: Namespace").unwrap();
        let configmap = from_str("kind: ConfigMap").unwrap();
        let service = from_str("kind: Service").unwrap();
        let deployment = from_str("kind: Deployment").unwrap();
        assert!(kind_rank(&namespace) < kind_rank(&configmap));
        assert!(kind_rank(&configmap) < kind_rank(&service));
        assert!(kind_rank(&service) < kind_rank(&deployment));
    }

    #[test]
    fn unknown_kinds_sort_last() {
        let custom = from_str("kind: CustomWidget").unwrap();
        let api_service = from_str("kind: APIService").unwrap();
        assert!(kind_rank(&api_service) < kind_rank(&custom));
    }

    #[test]
    fn filename_from_manifest_fields() {
        let doc = from_str("kind: Deployment\nmetadata:\n  name: Web").unwrap();
        assert_eq!(manifest_filename(&doc, "document"), "deployment-web.yaml");

        let bare = from_str("replicas: 3").unwrap();
        assert_eq!(manifest_filename(&bare, "stdin-0"), "stdin-0.yaml");
    }
}
