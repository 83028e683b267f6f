// SPDX-License-Identifier: MIT OR Apache-2.0
//! Integration tests for `classify` using realistic appliance payloads.

use faultline_classify::{RequestContext, classify};
use serde_json::{Value, json};

fn ctx() -> RequestContext {
    RequestContext::new()
}

fn render(body: &Value, ctx: &RequestContext) -> String {
    classify(body, ctx).to_string()
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Real message-object payloads
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn cluster_synchronize_failure() {
    let body = json!({
        "status": false,
        "error": {"message": "Cluster peer did not respond."}
    });
    let ctx = ctx().with_method("synchronize").with_module("cluster");
    assert_eq!(render(&body, &ctx), "Cluster peer did not respond.");
}

#[test]
fn profile_delete_failure_carries_the_profile_name() {
    let body = json!({
        "status": false,
        "error": {"message": "Internal is running"}
    });
    let ctx = ctx()
        .with_obj_type("profile")
        .with_method("delete")
        .with_module("sip")
        .with_name("Internal");
    assert_eq!(render(&body, &ctx), "Error for Internal: Internal is running");
}

#[test]
fn profile_create_conflict() {
    let body = json!({"status": false, "error": {"message": "Conflict"}});
    let ctx = ctx()
        .with_obj_type("profile")
        .with_method("create")
        .with_module("sip")
        .with_name("Internal");
    assert_eq!(
        render(&body, &ctx),
        "The key 'Internal' conflicts with the system"
    );
}

#[test]
fn domain_delete_blocked_by_referencing_profile() {
    let body = json!({
        "status": false,
        "error": {
            "message": "upreg_domain is use by",
            "obj": [{
                "name": "sip",
                "obj_name": "external_upreg",
                "obj_type": "profile"
            }]
        }
    });
    let ctx = ctx()
        .with_obj_type("domain")
        .with_method("delete")
        .with_module("directory")
        .with_name("upreg_domain");
    let fault = classify(&body, &ctx);
    assert_eq!(fault.kind(), "configuration_in_use");
    assert_eq!(
        fault.to_string(),
        "Error for upreg_domain: In use by profile 'external_upreg'"
    );
}

// ═══════════════════════════════════════════════════════════════════════
// 2. Apply / commit payloads
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn network_apply_failure_with_reason_lines() {
    let body = json!({
        "status": false,
        "error": {
            "message": ["Apply Network changes failed."],
            "reason": ["Cannot get DHCP IPv4 on eth1.", "Cannot get DHCP IPv6 on eth1."]
        }
    });
    let fault = classify(&body, &ctx().with_method("apply").with_module("network"));
    assert_eq!(fault.kind(), "apply_failed");
    assert_eq!(
        fault.to_string(),
        "Apply Network changes failed.: Cannot get DHCP IPv4 on eth1.\nCannot get DHCP IPv6 on eth1."
    );
}

#[test]
fn smartapply_failure_with_record_reasons() {
    let body = json!({
        "status": false,
        "error": {
            "message": "Apply configuration failed.",
            "reason": [
                {"url": "/config/network", "obj_type": "configuration", "type": "ERROR",
                 "description": "Default ipv4 gateway is not on eth0 subnet", "module": "network"},
                {"url": "/config/sip_profile", "obj_type": "profile", "type": "ERROR",
                 "description": "SIP Profile  Not defined", "module": "sip"}
            ]
        }
    });
    let fault = classify(&body, &ctx().with_method("smartapply").with_module("nsc"));
    assert_eq!(fault.kind(), "commit_failed");
    assert_eq!(
        fault.to_string(),
        "Apply configuration failed.: Default ipv4 gateway is not on eth0 subnet\nSIP Profile  Not defined"
    );
    assert_eq!(fault.reasons().len(), 2);
    assert_eq!(fault.reasons()[1].module, "sip");
}

#[test]
fn mixed_text_and_record_reasons_keep_order() {
    let body = json!({
        "status": false,
        "error": {
            "message": "Apply configuration failed.",
            "reason": [
                "Rolled back to the last good configuration.",
                {"obj_type": "configuration", "module": "network", "description": "bad gateway"}
            ]
        }
    });
    let fault = classify(&body, &ctx());
    assert_eq!(fault.kind(), "commit_failed");
    assert_eq!(
        fault.to_string(),
        "Apply configuration failed.: Rolled back to the last good configuration.\nbad gateway"
    );
}

#[test]
fn checklist_failure_collects_every_item() {
    let body = json!({
        "error": {
            "message": "Apply configuration failed.",
            "status": {
                "checklist": {
                    "status_text": "error",
                    "items": [
                        {"obj_type": "profile", "description": "SIP Profile  Not defined", "module": "sip"},
                        {"obj_type": "trunk", "description": "Trunk peer unreachable", "module": "sip"}
                    ]
                }
            }
        }
    });
    let fault = classify(&body, &ctx());
    assert_eq!(fault.reasons().len(), 2);
    assert_eq!(
        fault.to_string(),
        "Apply configuration failed.: SIP Profile  Not defined\nTrunk peer unreachable"
    );
}

#[test]
fn archive_restore_reports_every_record() {
    let body = json!([
        {"module": "Configuration Manager", "obj_type": "file update",
         "description": "vars_additional.xml", "type": "OK"},
        {"module": "Configuration Manager", "obj_type": "file update",
         "description": "autoload_configs/logfile.conf.xml", "type": "OK"}
    ]);
    let fault = classify(&body, &ctx().with_method("restore").with_obj_type("archive"));
    assert_eq!(fault.kind(), "bulk_apply_failed");
    let rendered = fault.to_string();
    assert!(rendered.starts_with("Failed to apply changes: "));
    assert!(rendered.contains("Configuration Manager - file update - vars_additional.xml - OK"));
}

// ═══════════════════════════════════════════════════════════════════════
// 3. Validation payloads
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn network_update_validation_failures() {
    let body = json!({
        "status": false,
        "error": {
            "global/gatewaydev": "The Default Gateway Interface field is required.",
            "global/hostname": "The Host Name field must contain a valid domain."
        }
    });
    let fault = classify(&body, &ctx().with_method("update").with_module("network"));
    assert_eq!(fault.kind(), "validation");
    assert_eq!(
        fault.to_string(),
        "global/gatewaydev: The Default Gateway Interface field is required.\n\
         global/hostname: The Host Name field must contain a valid domain."
    );
}

#[test]
fn deeply_nested_validation_paths_are_slash_joined() {
    let body = json!({
        "error": {
            "interfaces": {
                "eth0": {"address": "invalid IPv4 address"},
                "eth1": {"address": "invalid IPv4 address"}
            }
        }
    });
    let fault = classify(&body, &ctx());
    assert_eq!(
        fault.to_string(),
        "interfaces/eth0/address: invalid IPv4 address\n\
         interfaces/eth1/address: invalid IPv4 address"
    );
}

// ═══════════════════════════════════════════════════════════════════════
// 4. Degraded and adversarial shapes
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn unknown_shapes_never_fail() {
    let bodies = [
        json!(null),
        json!(0),
        json!(false),
        json!([]),
        json!([[]]),
        json!({}),
        json!({"error": null}),
        json!({"error": 17}),
        json!({"error": {}}),
        json!({"error": {"reason": []}}),
        json!({"error": {"status": {"checklist": {"items": []}}}}),
    ];
    for body in &bodies {
        let fault = classify(body, &ctx().with_name("Internal"));
        assert!(!fault.to_string().is_empty(), "empty render for {body}");
    }
}

#[test]
fn deeply_nested_reason_tree_terminates() {
    let mut reason = json!({"obj_type": "profile", "module": "sip", "description": "leaf"});
    for _ in 0..100 {
        reason = json!({"reason": [reason]});
    }
    let body = json!({"error": {"message": "Apply failed.", "reason": reason}});
    // Depth-capped walk: no stack overflow, and still a usable fault.
    let fault = classify(&body, &ctx());
    assert!(!fault.to_string().is_empty());
}
