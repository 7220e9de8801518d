//! The built-in matcher catalog.

pub mod args;
mod basic;
mod calls;
mod equality;
mod snapshot;
mod throw;

use crate::registry::Matchers;

/// Every built-in matcher, with the legacy aliases.
pub fn builtins() -> Matchers {
    Matchers::new()
        .with("toBe", equality::to_be)
        .with("toEqual", equality::to_equal)
        .with("toStrictEqual", equality::to_strict_equal)
        .with("toMatchObject", equality::to_match_object)
        .with("toContain", equality::to_contain)
        .with("toContainEqual", equality::to_contain_equal)
        .with("toHaveProperty", equality::to_have_property)
        .with("toBeTruthy", basic::to_be_truthy)
        .with("toBeFalsy", basic::to_be_falsy)
        .with("toBeNull", basic::to_be_null)
        .with("toBeUndefined", basic::to_be_undefined)
        .with("toBeDefined", basic::to_be_defined)
        .with("toBeNaN", basic::to_be_nan)
        .with("toBeTypeOf", basic::to_be_type_of)
        .with("toBeInstanceOf", basic::to_be_instance_of)
        .with("toBeGreaterThan", basic::to_be_greater_than)
        .with("toBeGreaterThanOrEqual", basic::to_be_greater_than_or_equal)
        .with("toBeLessThan", basic::to_be_less_than)
        .with("toBeLessThanOrEqual", basic::to_be_less_than_or_equal)
        .with("toBeCloseTo", basic::to_be_close_to)
        .with("toHaveLength", basic::to_have_length)
        .with("toMatch", basic::to_match)
        .with("toSatisfy", basic::to_satisfy)
        .with("toThrow", throw::to_throw)
        .with("toThrowError", throw::to_throw)
        .with("toHaveBeenCalled", calls::to_have_been_called)
        .with("toHaveBeenCalledOnce", calls::to_have_been_called_once)
        .with("toHaveBeenCalledTimes", calls::to_have_been_called_times)
        .with("toHaveBeenCalledWith", calls::to_have_been_called_with)
        .with("toHaveBeenLastCalledWith", calls::to_have_been_last_called_with)
        .with("toHaveBeenNthCalledWith", calls::to_have_been_nth_called_with)
        .with("toHaveReturned", calls::to_have_returned)
        .with("toHaveReturnedTimes", calls::to_have_returned_times)
        .with("toHaveReturnedWith", calls::to_have_returned_with)
        .with("toHaveLastReturnedWith", calls::to_have_last_returned_with)
        .with("toHaveNthReturnedWith", calls::to_have_nth_returned_with)
        .with("toMatchSnapshot", snapshot::to_match_snapshot)
        .with("toMatchInlineSnapshot", snapshot::to_match_inline_snapshot)
        .with("toMatchFileSnapshot", snapshot::to_match_file_snapshot)
        .with("toThrowErrorMatchingSnapshot", snapshot::to_throw_error_matching_snapshot)
        .with("toThrowErrorMatchingInlineSnapshot", snapshot::to_throw_error_matching_inline_snapshot)
        .alias("toBeCalled", "toHaveBeenCalled")
        .alias("toBeCalledTimes", "toHaveBeenCalledTimes")
        .alias("toBeCalledWith", "toHaveBeenCalledWith")
        .alias("lastCalledWith", "toHaveBeenLastCalledWith")
        .alias("nthCalledWith", "toHaveBeenNthCalledWith")
        .alias("toReturn", "toHaveReturned")
        .alias("toReturnTimes", "toHaveReturnedTimes")
        .alias("toReturnWith", "toHaveReturnedWith")
        .alias("lastReturnedWith", "toHaveLastReturnedWith")
        .alias("nthReturnedWith", "toHaveNthReturnedWith")
        .alias("matchSnapshot", "toMatchSnapshot")
}
