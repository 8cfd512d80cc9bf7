use super::*;

#[test]
fn finds_value_among_other_entries() {
    let jar = "sessionid=abc; csrftoken=tok123; theme=dark";
    assert_eq!(get_cookie(jar, "csrftoken").as_deref(), Some("tok123"));
    assert_eq!(get_cookie(jar, "sessionid").as_deref(), Some("abc"));
    assert_eq!(get_cookie(jar, "theme").as_deref(), Some("dark"));
}

#[test]
fn trims_whitespace_around_entries() {
    let jar = "  a=1 ;   csrftoken=xyz   ;b=2";
    assert_eq!(get_cookie(jar, "csrftoken").as_deref(), Some("xyz"));
}

#[test]
fn missing_name_or_empty_string_is_none() {
    assert_eq!(get_cookie("", "csrftoken"), None);
    assert_eq!(get_cookie("a=1; b=2", "csrftoken"), None);
}

#[test]
fn does_not_match_on_shared_prefix() {
    let jar = "csrftokenold=stale; csrftoken=fresh";
    assert_eq!(get_cookie(jar, "csrftoken").as_deref(), Some("fresh"));
    assert_eq!(get_cookie("csrf=1", "csrftoken"), None);
}

#[test]
fn value_may_contain_equals_signs() {
    let jar = "token=YWJj==; other=1";
    assert_eq!(get_cookie(jar, "token").as_deref(), Some("YWJj=="));
}

#[test]
fn first_match_in_document_order_wins() {
    let jar = "csrftoken=first; csrftoken=second";
    assert_eq!(get_cookie(jar, "csrftoken").as_deref(), Some("first"));
}

#[test]
fn value_is_percent_decoded() {
    let jar = "name=J%C3%BCrgen%20M; plus=a+b";
    assert_eq!(get_cookie(jar, "name").as_deref(), Some("Jürgen M"));
    assert_eq!(get_cookie(jar, "plus").as_deref(), Some("a+b"));
}

#[test]
fn empty_value_is_present_but_empty() {
    assert_eq!(get_cookie("csrftoken=; a=1", "csrftoken").as_deref(), Some(""));
}
