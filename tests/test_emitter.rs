//! Humanized emitter behavior: sequence layout, key ordering, scalar
//! styles and round-trip validity.

use indoc::indoc;
use yaml_for_humans::{from_str, to_string, to_string_with, DumpOptions, PRIORITY_KEYS};

#[test]
fn string_sequences_are_inline() {
    let doc = from_str(indoc! {"
        items:
          - first
          - second
          - third
    "})
    .unwrap();
    assert_eq!(
        to_string(&doc).unwrap(),
        "items:\n  - first\n  - second\n  - third\n"
    );
}

#[test]
fn object_sequences_put_the_dash_alone() {
    let doc = from_str(indoc! {"
        containers:
          - name: web
            image: nginx:latest
          - name: app
            image: python:3.9
    "})
    .unwrap();
    let out = to_string(&doc).unwrap();

    assert!(out.contains("containers:\n  -\n    name: web"));
    assert!(out.contains("image: nginx:latest\n  -\n    name: app"));
}

#[test]
fn mixed_sequences() {
    let doc = from_str(indoc! {"
        command: [/bin/sh, -c, echo hello]
        volumes:
          - name: data
            path: /data
          - name: logs
            path: /logs
    "})
    .unwrap();
    let out = to_string(&doc).unwrap();

    // Scalar items stay on the dash line.
    assert!(out.contains("  - /bin/sh\n  - -c\n  - echo hello"));
    // Container items do not.
    assert!(out.contains("volumes:\n  -\n    name: data"));
}

#[test]
fn nested_sequences() {
    let doc = from_str("matrix: [[a, b, c], [d, e, f]]").unwrap();
    let out = to_string(&doc).unwrap();
    assert!(out.contains("matrix:\n  -\n    - a\n    - b\n    - c\n  -\n    - d"));
}

#[test]
fn empty_containers_render_flow_style() {
    let doc = from_str(indoc! {"
        resources: {}
        empty_list: []
        populated:
          key: value
    "})
    .unwrap();
    let out = to_string(&doc).unwrap();

    assert!(out.contains("resources: {}"));
    assert!(out.contains("empty_list: []"));
    assert!(out.contains("populated:\n  key: value"));
}

#[test]
fn empty_containers_in_sequences_stay_on_the_dash() {
    let doc = from_str(indoc! {"
        egress: [{}]
        mixed: [[], {}, scalar]
    "})
    .unwrap();
    let out = to_string(&doc).unwrap();

    assert!(out.contains("egress:\n  - {}"));
    assert!(out.contains("mixed:\n  - []\n  - {}\n  - scalar"));
}

#[test]
fn indentation_is_consistent() {
    let doc = from_str(indoc! {"
        spec:
          containers:
            - name: test
              envFrom:
                - configMapRef:
                    name: config1
                - secretRef:
                    name: secret1
    "})
    .unwrap();
    let out = to_string(&doc).unwrap();
    let lines: Vec<&str> = out.lines().collect();

    let dash = lines
        .iter()
        .position(|line| line.trim() == "-")
        .expect("container item dash");
    assert_eq!(lines[dash - 1].trim(), "containers:");
    assert!(lines[dash].starts_with("    -"));
    assert!(lines[dash + 1].starts_with("      name:"));
}

#[test]
fn priority_keys_come_first() {
    let doc = from_str(indoc! {"
        volumeMounts:
          - path: /data
        name: test-container
        resources:
          limits:
            cpu: 100m
        image: nginx:latest
        ports:
          - containerPort: 80
        imagePullPolicy: Always
    "})
    .unwrap();
    let out = to_string(&doc).unwrap();

    let key_order: Vec<&str> = out
        .lines()
        .filter(|line| !line.starts_with(' ') && line.contains(':'))
        .map(|line| line.split(':').next().unwrap())
        .collect();
    assert_eq!(
        key_order,
        ["name", "image", "imagePullPolicy", "volumeMounts", "resources", "ports"]
    );

    let hoisted: Vec<&str> = key_order
        .iter()
        .copied()
        .filter(|key| PRIORITY_KEYS.contains(key))
        .collect();
    assert_eq!(hoisted, ["name", "image", "imagePullPolicy"]);
}

#[test]
fn non_priority_keys_keep_their_order() {
    let doc = from_str("zebra: last\nalpha: first\nname: priority\nbeta: second").unwrap();
    let out = to_string(&doc).unwrap();
    let keys: Vec<&str> = out.lines().map(|l| l.split(':').next().unwrap()).collect();
    assert_eq!(keys, ["name", "zebra", "alpha", "beta"]);
}

#[test]
fn priority_ordering_can_be_disabled() {
    let doc = from_str("zebra: last\nname: priority").unwrap();
    let opts = DumpOptions::new().priority_keys(false);
    assert_eq!(
        to_string_with(&doc, &opts).unwrap(),
        "zebra: last\nname: priority\n"
    );
}

#[test]
fn multiline_strings_use_literal_blocks() {
    let doc = from_str(indoc! {r#"
        single: single line
        multi: "line1\nline2\nline3"
    "#})
    .unwrap();
    let out = to_string(&doc).unwrap();

    assert!(out.contains("multi: |-\n  line1\n  line2\n  line3"));
    assert!(out.contains("single: single line"));
    assert!(!out.contains("\\n"));

    let reloaded = from_str(&out).unwrap();
    assert_eq!(reloaded, doc);
}

#[test]
fn trailing_newlines_choose_the_chomping_indicator() {
    let clip = from_str("text: \"a\\nb\\n\"").unwrap();
    assert_eq!(to_string(&clip).unwrap(), "text: |\n  a\n  b\n");

    let keep = from_str("text: \"a\\n\\n\"").unwrap();
    assert_eq!(to_string(&keep).unwrap(), "text: |+\n  a\n\n");

    for source in &[clip, keep] {
        let out = to_string(source).unwrap();
        assert_eq!(&from_str(&out).unwrap(), source);
    }
}

#[test]
fn ambiguous_strings_are_quoted_for_round_trips() {
    let doc = from_str(indoc! {r#"
        number_like: '8080'
        bool_like: 'true'
        null_like: 'null'
        colon: 'value with: colon and - dash'
        empty: ''
    "#})
    .unwrap();
    let out = to_string(&doc).unwrap();

    assert!(out.contains("number_like: '8080'"));
    assert!(out.contains("bool_like: 'true'"));
    assert!(out.contains("null_like: 'null'"));
    assert!(out.contains("colon: 'value with: colon and - dash'"));
    assert!(out.contains("empty: ''"));

    let reloaded = from_str(&out).unwrap();
    assert_eq!(reloaded, doc);
}

#[test]
fn round_trip_complex_document() {
    let doc = from_str(indoc! {r#"
        apiVersion: v1
        kind: Pod
        metadata:
          name: test-pod
          labels:
            app: test
        spec:
          containers:
            - name: web
              image: nginx:latest
              command: [/bin/sh, -c, echo "hello world"]
              env:
                - name: VAR1
                  value: val1
              resources: {}
    "#})
    .unwrap();

    let out = to_string(&doc).unwrap();
    let reloaded = from_str(&out).unwrap();
    assert_eq!(reloaded, doc);

    // A second pass must be textually stable.
    assert_eq!(to_string(&reloaded).unwrap(), out);
}

#[test]
fn scalar_documents() {
    assert_eq!(to_string(&from_str("hello").unwrap()).unwrap(), "hello\n");
    assert_eq!(to_string(&from_str("42").unwrap()).unwrap(), "42\n");
    assert_eq!(to_string(&from_str("null").unwrap()).unwrap(), "null\n");
    assert_eq!(to_string(&from_str("{}").unwrap()).unwrap(), "{}\n");
    assert_eq!(to_string(&from_str("[]").unwrap()).unwrap(), "[]\n");
}

#[test]
fn custom_indent_width() {
    let doc = from_str("test:\n  - item1\n  - item2").unwrap();
    let opts = DumpOptions::new().indent(4);
    assert_eq!(
        to_string_with(&doc, &opts).unwrap(),
        "test:\n    - item1\n    - item2\n"
    );
}
