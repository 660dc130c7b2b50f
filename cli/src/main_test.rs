use super::*;

#[test]
fn parses_login_with_flags() {
    let cli = Cli::try_parse_from(["blog", "--base-url", "http://api.test", "login", "--user-name", "alice", "--password", "pw"])
        .unwrap();
    assert_eq!(cli.base_url, "http://api.test");
    assert!(matches!(cli.command, Command::Login { ref user_name, .. } if user_name == "alice"));
}

#[test]
fn zero_timeouts_are_rejected() {
    for flag in ["--request-timeout-secs", "--connect-timeout-secs"] {
        let err = Cli::try_parse_from(["blog", flag, "0", "logout"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation, "{flag} accepted 0");
    }
}

#[test]
fn connect_timeout_defaults_when_unset() {
    let cli = Cli::try_parse_from(["blog", "--request-timeout-secs", "5", "logout"]).unwrap();
    assert_eq!(cli.request_timeout_secs, 5);
    assert_eq!(cli.connect_timeout_secs, DEFAULT_CONNECT_TIMEOUT_SECS);
}

#[test]
fn posts_list_defaults_to_first_page() {
    let cli = Cli::try_parse_from(["blog", "posts", "list", "--tag", "rust"]).unwrap();
    let Command::Posts(PostsCommand { command: PostsSubcommand::List { page, tag } }) = cli.command else {
        panic!("expected posts list");
    };
    assert_eq!(PageRequest::from(page), PageRequest::default());
    assert_eq!(tag.as_deref(), Some("rust"));
}

#[test]
fn create_collects_repeated_tags() {
    let cli = Cli::try_parse_from([
        "blog", "posts", "create", "--title", "T", "--content", "C", "--tag", "rust", "--tag", "async",
    ])
    .unwrap();
    let Command::Posts(PostsCommand { command: PostsSubcommand::Create { draft, image } }) = cli.command else {
        panic!("expected posts create");
    };
    assert!(image.is_none());
    assert_eq!(PostDraft::from(draft).tags, vec!["rust".to_owned(), "async".to_owned()]);
}

#[test]
fn image_mime_by_extension() {
    assert_eq!(image_mime("cat.PNG"), "image/png");
    assert_eq!(image_mime("a.jpeg"), "image/jpeg");
    assert_eq!(image_mime("noext"), "application/octet-stream");
}
