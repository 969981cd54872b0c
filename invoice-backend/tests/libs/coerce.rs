use chrono::NaiveDate;
use laboratory::{SpecContext, expect};
use serde_json::{Value, json};

use invoice_backend::libs::coerce;

use crate::TestState;

/// Test [`coerce::strict_bool`] and [`coerce::loose_bool`].
pub fn bool(_context: &mut SpecContext<TestState>) -> Result<(), String> {
    expect(coerce::strict_bool(&json!(true))).to_equal(true)?;
    expect(coerce::strict_bool(&json!("TRUE"))).to_equal(true)?;
    expect(coerce::strict_bool(&json!("on"))).to_equal(false)?;
    expect(coerce::strict_bool(&json!(1))).to_equal(false)?;
    expect(coerce::strict_bool(&Value::Null)).to_equal(false)?;

    expect(coerce::loose_bool(&json!(true))).to_equal(true)?;
    expect(coerce::loose_bool(&json!("on"))).to_equal(true)?;
    expect(coerce::loose_bool(&json!("1"))).to_equal(true)?;
    expect(coerce::loose_bool(&json!(2))).to_equal(true)?;
    expect(coerce::loose_bool(&json!(0))).to_equal(false)?;
    expect(coerce::loose_bool(&json!("off"))).to_equal(false)?;
    expect(coerce::loose_bool(&json!([]))).to_equal(false)
}

/// Test [`coerce::number`] and [`coerce::number_value`].
pub fn number(_context: &mut SpecContext<TestState>) -> Result<(), String> {
    expect(coerce::number(&json!(12.5))).to_equal(Some(12.5))?;
    expect(coerce::number(&json!("$1,234.50"))).to_equal(Some(1234.5))?;
    expect(coerce::number(&json!(" 42 "))).to_equal(Some(42.0))?;
    expect(coerce::number(&json!(""))).to_equal(None)?;
    expect(coerce::number(&json!("abc"))).to_equal(None)?;
    expect(coerce::number(&json!("NaN"))).to_equal(None)?;
    expect(coerce::number(&Value::Null)).to_equal(None)?;

    expect(coerce::number_value(&json!("1,000"))).to_equal(json!(1000.0))?;
    expect(coerce::number_value(&json!(""))).to_equal(Value::Null)
}

/// Test [`coerce::date`] and [`coerce::iso_date`].
pub fn date(_context: &mut SpecContext<TestState>) -> Result<(), String> {
    let expected = NaiveDate::from_ymd_opt(2024, 3, 15);
    expect(coerce::date(&json!("2024-03-15"))).to_equal(expected)?;
    expect(coerce::date(&json!("15/03/2024"))).to_equal(expected)?;
    expect(coerce::date(&json!("03-15-2024"))).to_equal(None)?;
    expect(coerce::date(&json!(20240315))).to_equal(None)?;

    expect(coerce::iso_date(&json!("2024-03-15"))).to_equal(expected)?;
    expect(coerce::iso_date(&json!("15/03/2024"))).to_equal(None)
}

/// Test [`coerce::object`] and [`coerce::array`].
pub fn object_array(_context: &mut SpecContext<TestState>) -> Result<(), String> {
    let obj = coerce::object(&json!({"a": 1}));
    expect(obj.get("a")).to_equal(Some(&json!(1)))?;
    let obj = coerce::object(&json!("{\"b\":\"x\"}"));
    expect(obj.get("b")).to_equal(Some(&json!("x")))?;
    expect(coerce::object(&json!("not json")).len()).to_equal(0)?;
    expect(coerce::object(&json!([1])).len()).to_equal(0)?;

    expect(coerce::array(&json!([1, 2]))).to_equal(Some(vec![json!(1), json!(2)]))?;
    expect(coerce::array(&json!("[\"x\"]"))).to_equal(Some(vec![json!("x")]))?;
    expect(coerce::array(&json!("{}"))).to_equal(None)?;
    expect(coerce::array(&json!(1))).to_equal(None)
}

/// Test [`coerce::text`].
pub fn text(_context: &mut SpecContext<TestState>) -> Result<(), String> {
    expect(coerce::text(&json!("abc"))).to_equal(Some("abc".to_string()))?;
    expect(coerce::text(&json!(12))).to_equal(Some("12".to_string()))?;
    expect(coerce::text(&json!(""))).to_equal(None)?;
    expect(coerce::text(&Value::Null)).to_equal(None)
}

/// Test [`coerce::get_path`].
pub fn get_path(_context: &mut SpecContext<TestState>) -> Result<(), String> {
    let value = json!({"financialDetails": {"paymentTerms": "Net 30"}, "name": "x"});
    let map = value.as_object().unwrap();
    expect(coerce::get_path(map, "name")).to_equal(Some(&json!("x")))?;
    expect(coerce::get_path(map, "financialDetails.paymentTerms"))
        .to_equal(Some(&json!("Net 30")))?;
    expect(coerce::get_path(map, "financialDetails.missing")).to_equal(None)?;
    expect(coerce::get_path(map, "name.sub")).to_equal(None)
}

/// Test [`coerce::is_truthy`].
pub fn is_truthy(_context: &mut SpecContext<TestState>) -> Result<(), String> {
    expect(coerce::is_truthy(None)).to_equal(false)?;
    expect(coerce::is_truthy(Some(&Value::Null))).to_equal(false)?;
    expect(coerce::is_truthy(Some(&json!("")))).to_equal(false)?;
    expect(coerce::is_truthy(Some(&json!(0)))).to_equal(false)?;
    expect(coerce::is_truthy(Some(&json!({})))).to_equal(false)?;
    expect(coerce::is_truthy(Some(&json!("a")))).to_equal(true)?;
    expect(coerce::is_truthy(Some(&json!(0.5)))).to_equal(true)?;
    expect(coerce::is_truthy(Some(&json!([0])))).to_equal(true)
}
