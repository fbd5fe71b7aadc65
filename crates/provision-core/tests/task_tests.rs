#[cfg(test)]
mod tests {
    use provision_core::task::{parse_script, ScriptEntry, Status, Task};

    #[test]
    fn test_hash_is_deterministic() {
        let a = Task::shell("install package xxx");
        let b = Task::shell("install package xxx");
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.hash().as_str().len(), 64);
        assert!(a.hash().as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_distinguishes_tasks() {
        let shell = Task::shell("chmod 400 /etc/xxx/conf.ini");
        let other = Task::shell("chmod 600 /etc/xxx/conf.ini");
        let fetch = Task::fetch("configuration-file", "/etc/xxx/conf.ini");
        assert_ne!(shell.hash(), other.hash());
        assert_ne!(shell.hash(), fetch.hash());
    }

    #[test]
    fn test_fetch_hash_ignores_server_key_order() {
        let entries = parse_script(
            "- {key: configuration-file, target: /etc/xxx/conf.ini}\n- {target: /etc/xxx/conf.ini, key: configuration-file}\n",
        )
        .unwrap();
        let hashes: Vec<_> = entries
            .iter()
            .map(|e| match e {
                ScriptEntry::Task(t) => t.hash(),
                other => panic!("unexpected entry {:?}", other),
            })
            .collect();
        assert_eq!(hashes[0], hashes[1]);
    }

    #[test]
    fn test_task_display_is_compact_json() {
        assert_eq!(Task::shell("echo \"hi\"").to_string(), r#""echo \"hi\"""#);
        assert_eq!(
            Task::fetch("yin", "yang").to_string(),
            r#"{"key":"yin","target":"yang"}"#
        );
    }

    #[test]
    fn test_parse_script_classifies_entries() {
        let text = r#"
- install package xxx
- key: configuration-file
  target: /etc/xxx/conf.ini
- include: second-script
- make-coffee: black
- [not, a, task]
"#;
        let entries = parse_script(text).unwrap();
        assert_eq!(
            entries,
            vec![
                ScriptEntry::Task(Task::shell("install package xxx")),
                ScriptEntry::Task(Task::fetch("configuration-file", "/etc/xxx/conf.ini")),
                ScriptEntry::Include("second-script".to_string()),
                ScriptEntry::Malformed(r#"{"make-coffee":"black"}"#.to_string()),
                ScriptEntry::Malformed(r#"["not","a","task"]"#.to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_script_keeps_scalars_as_text() {
        let entries = parse_script("- 42\n- true\n- 'yes'\n- 1.10\n- 0x1F\n- True\n- null\n- ~\n").unwrap();
        assert_eq!(
            entries,
            vec![
                ScriptEntry::Task(Task::shell("42")),
                ScriptEntry::Task(Task::shell("true")),
                ScriptEntry::Task(Task::shell("yes")),
                ScriptEntry::Task(Task::shell("1.10")),
                ScriptEntry::Task(Task::shell("0x1F")),
                ScriptEntry::Task(Task::shell("True")),
                ScriptEntry::Task(Task::shell("null")),
                ScriptEntry::Task(Task::shell("~")),
            ]
        );
    }

    #[test]
    fn test_fetch_fields_keep_source_text() {
        let entries = parse_script("- {key: 0x1F, target: 1.10}\n- include: 007\n").unwrap();
        assert_eq!(
            entries,
            vec![
                ScriptEntry::Task(Task::fetch("0x1F", "1.10")),
                ScriptEntry::Include("007".to_string()),
            ]
        );
    }

    #[test]
    fn test_aliases_are_expanded() {
        let entries = parse_script("- &cmd echo hi\n- *cmd\n").unwrap();
        assert_eq!(
            entries,
            vec![
                ScriptEntry::Task(Task::shell("echo hi")),
                ScriptEntry::Task(Task::shell("echo hi")),
            ]
        );
    }

    #[test]
    fn test_parse_script_accepts_json() {
        let entries = parse_script(r#"["echo one", {"include": "other"}]"#).unwrap();
        assert_eq!(
            entries,
            vec![
                ScriptEntry::Task(Task::shell("echo one")),
                ScriptEntry::Include("other".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_script_rejects_non_lists() {
        assert!(parse_script("not a script").is_none());
        assert!(parse_script("key: value").is_none());
        assert!(parse_script("- [unclosed").is_none());
    }

    #[test]
    fn test_mapping_with_extra_keys_is_malformed() {
        let entries = parse_script("- {key: a, target: b, mode: '0600'}\n- {include: a, key: b}\n").unwrap();
        assert!(matches!(entries[0], ScriptEntry::Malformed(_)));
        assert!(matches!(entries[1], ScriptEntry::Malformed(_)));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::Pending.to_string(), "pending");
        assert_eq!(Status::Success.to_string(), "success");
        assert_eq!(Status::Failure.to_string(), "failure");
        assert_eq!(serde_json::to_string(&Status::Failure).unwrap(), "\"failure\"");
    }
}
