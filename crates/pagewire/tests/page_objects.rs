//! End-to-end page object scenarios against the in-memory page.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::thread;
use std::time::Duration;

use pagewire::mock::{MockElement, MockPage, NodeId};
use pagewire::prelude::*;

// ============================================================================
// Page fixtures
// ============================================================================

#[derive(Composite)]
#[wire(rename_all = "camelCase")]
struct LoginScreen {
    user_name: Wired<TextField>,
    #[wire(id = "pwd")]
    password: Wired<TextField>,
    #[wire(path("form", "rememberMe"))]
    remember: Wired<CheckBox>,
    #[wire(path("footer", "login"))]
    login: Wired<Button>,
    #[wire(skip)]
    attempts: u32,
}

#[derive(Composite)]
struct UsersScreen {
    people: Wired<DataGrid>,
    #[wire(id = "userTabs")]
    tabs: Wired<TabSheet>,
}

#[derive(Composite)]
struct Shell {
    #[wire(id = "menu")]
    menu: Wired<SideMenu>,
    #[wire(id = "loginPanel")]
    login: Nested<LoginScreen>,
}

fn login_page() -> (MockPage, NodeId) {
    let page = MockPage::new();
    let panel = page.root(MockElement::div().with_test_id("loginPanel"));
    let user = page.child(panel, MockElement::div().with_test_id("userName"));
    page.child(user, MockElement::input(""));
    let pwd = page.child(panel, MockElement::div().with_test_id("pwd"));
    page.child(pwd, MockElement::input(""));
    let form = page.child(panel, MockElement::div().with_test_id("form"));
    let remember = page.child(form, MockElement::div().with_test_id("rememberMe"));
    let checkbox = page.child(remember, MockElement::checkbox(false));
    page.child(remember, MockElement::new("label").with_text("Remember me"));
    let footer = page.child(panel, MockElement::div().with_test_id("footer"));
    page.child(
        footer,
        MockElement::new("button")
            .with_test_id("login")
            .with_text("Log in"),
    );
    (page, checkbox)
}

// ============================================================================
// Composite wiring
// ============================================================================

#[test]
fn derived_schema_lists_fields_in_order() {
    let schema = <LoginScreen as pagewire::page_object::Composite>::schema();
    assert_eq!(schema.name(), "LoginScreen");
    assert_eq!(
        schema.field_names(),
        vec!["userName", "password", "remember", "login"]
    );
    assert_eq!(schema.get("remember").unwrap().kind(), "CheckBox");
    assert_eq!(schema.get("password").unwrap().segments(), vec!["pwd"]);
}

#[test]
fn nested_login_form_fills_in() {
    let (page, checkbox) = login_page();
    let shell: Shell = page.session().resolve_composite();
    assert!(page.history().is_empty());

    let login = &shell.login;
    assert_eq!(login.attempts, 0);
    login.user_name.set_value("ada").unwrap();
    login.password.set_value("s3cret").unwrap();
    login.remember.set_checked(true).unwrap();

    assert!(login.user_name.has(&value("ada")).unwrap());
    assert!(login.remember.is(&checked()).unwrap());
    assert!(page.attribute(checkbox, "checked").is_some());
    assert_eq!(
        login.remember.locator().to_string(),
        "By.stableId: loginPanel > By.stableId: form > By.stableId: rememberMe"
    );
    login.login.should(&caption("Log in")).unwrap().click().unwrap();
}

#[test]
fn checkbox_resolved_by_path() {
    let page = MockPage::new();
    let form = page.root(MockElement::div().with_test_id("form"));
    let root = page.child(form, MockElement::div().with_test_id("rememberMe"));
    page.child(root, MockElement::checkbox(false));

    let remember: CheckBox = page.session().resolve(["form", "rememberMe"]).unwrap();
    assert_eq!(
        remember.locator(),
        &chain([
            LocatorStep::stable_id("form"),
            LocatorStep::stable_id("rememberMe")
        ])
        .unwrap()
    );
    remember
        .should_not(&checked())
        .unwrap()
        .set_checked(true)
        .unwrap()
        .should(&checked())
        .unwrap();
}

// ============================================================================
// Navigation
// ============================================================================

fn users_page() -> MockPage {
    let page = MockPage::new();
    let menu = page.root(MockElement::div().with_test_id("menu"));
    let container = page.child(menu, MockElement::div().with_class("side-menu-container"));
    let admin = page.child(
        container,
        MockElement::div()
            .with_class("side-menu-item")
            .with_test_id("admin")
            .with_text("Administration"),
    );
    let users = page.child(
        admin,
        MockElement::div()
            .with_class("side-menu-item")
            .with_test_id("users")
            .with_text("Users")
            .hidden(),
    );
    page.on_click(admin, move |dom| {
        dom.add_class(admin, "side-menu-item-open");
        dom.set_displayed(users, true);
    });

    let screen = page.root(MockElement::div().with_test_id("screen").hidden());
    page.on_click(users, move |dom| dom.set_displayed(screen, true));

    let grid = page.child(screen, MockElement::div().with_test_id("people"));
    for (first, last) in [("Ada", "Lovelace"), ("Grace", "Hopper")] {
        let row = page.child(grid, MockElement::div().with_class("grid-row"));
        page.child(row, MockElement::span(first).with_class("grid-cell"));
        page.child(row, MockElement::span(last).with_class("grid-cell"));
    }
    let tabs = page.child(screen, MockElement::div().with_test_id("userTabs"));
    for (i, title) in ["Details", "Roles"].into_iter().enumerate() {
        let tab = page.child(tabs, MockElement::div().with_class("tab"));
        page.child(tab, MockElement::span(title).with_class("caption"));
        if i == 0 {
            page.add_class(tab, "tab-selected");
        }
    }
    page
}

#[test]
fn side_menu_opens_screen() {
    let page = users_page();
    let shell: Shell = page.session().resolve_composite();
    let screen: UsersScreen = shell.menu.open_item_as(&["admin", "users"]).unwrap();

    screen.people.should(&visible()).unwrap();
    let grace = screen
        .people
        .row(LocatorStep::cells(["Grace", "Hopper"]))
        .unwrap();
    assert_eq!(grace.cells().unwrap(), vec!["Grace", "Hopper"]);
    assert!(screen
        .people
        .cell(LocatorStep::row_col(0, 1))
        .unwrap()
        .has(&caption("Lovelace"))
        .unwrap());

    let selected = screen.tabs.tab(LocatorStep::selected()).unwrap();
    assert_eq!(selected.caption().unwrap(), "Details");
    assert_eq!(screen.tabs.visible_tabs().unwrap().len(), 2);
}

// ============================================================================
// Waiting
// ============================================================================

#[test]
fn should_waits_for_late_render() {
    let page = MockPage::new();
    let session = page.session();
    let banner: Label = session.resolve("banner").unwrap();

    let writer = page.clone();
    let render = thread::spawn(move || {
        thread::sleep(Duration::from_millis(80));
        writer.root(MockElement::span("Saved").with_test_id("banner"));
    });

    banner
        .should(&visible())
        .unwrap()
        .should(&caption("Saved"))
        .unwrap();
    render.join().unwrap();
}

#[test]
fn should_not_within_reports_the_expectation() {
    let page = MockPage::new();
    page.root(MockElement::span("Saved").with_test_id("banner"));
    let banner: Label = page.session().resolve("banner").unwrap();

    let err = banner
        .should_not_within(&visible(), Duration::from_millis(60))
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("not be visible"), "{message}");
    assert!(message.contains("60ms"), "{message}");
}

#[test]
fn custom_condition_reads_the_probe() {
    let (page, _) = login_page();
    let name: TextField = page.session().resolve(["loginPanel", "userName"]).unwrap();
    let long_value = custom("value longer than 3", |probe| {
        Ok(probe.input()?.value()?.unwrap_or_default().len() > 3)
    });

    assert!(!name.is(&long_value).unwrap());
    name.set_value("Grace").unwrap();
    name.should_within(&long_value, Duration::from_millis(200))
        .unwrap();
}

#[test]
fn unsupported_condition_fails_fast() {
    let (page, _) = login_page();
    let login: Button = page
        .session()
        .resolve(["loginPanel", "footer", "login"])
        .unwrap();
    let err = login.should(&checked()).unwrap_err();
    assert!(matches!(err, PagewireError::UnsupportedCondition { .. }));
    assert!(!page.was_called("find_all:"));
}
