//! EIP-712 Type Resolution
//!
//! Computes the struct dependency set of a type and renders its canonical
//! type string: `Primary(type name,...)` followed by every referenced struct
//! in lexicographic order.

use super::types::*;
use crate::utils::crypto::keccak256;
use std::collections::HashSet;

/// Reduce a type string to its leading identifier
/// e.g., "Person[]" -> "Person", "uint256[10]" -> "uint256"
pub fn get_base_type(type_name: &str) -> &str {
    type_name
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .next()
        .unwrap_or(type_name)
}

/// Find all struct types reachable from `type_name`, including itself.
///
/// Traversal is depth-first and the result keeps first-discovery order.
/// Types that are absent from the table, or declare no fields, end the
/// walk; the visited set terminates cycles. An explicit stack keeps long
/// reference chains off the call stack.
pub fn find_type_dependencies(type_name: &str, types: &Types) -> Vec<String> {
    let mut found = Vec::new();
    let mut visited = HashSet::new();
    let mut pending = vec![type_name];

    while let Some(next) = pending.pop() {
        let base_type = get_base_type(next);
        let fields = match types.get(base_type) {
            Some(fields) if !fields.is_empty() => fields,
            _ => continue,
        };
        if !visited.insert(base_type) {
            continue;
        }
        found.push(base_type.to_string());

        // Reversed so the first field is explored first
        pending.extend(fields.iter().rev().map(|field| field.type_name.as_str()));
    }

    found
}

/// Encode the canonical type string for a struct type
/// Format: "TypeName(type1 name1,type2 name2,...)Dep1(...)Dep2(...)"
pub fn encode_type(type_name: &str, types: &Types) -> Result<String, Eip712Error> {
    let mut sorted_deps: Vec<String> = find_type_dependencies(type_name, types)
        .into_iter()
        .filter(|dep| dep != type_name)
        .collect();
    sorted_deps.sort();

    let mut result = String::new();
    for name in std::iter::once(type_name).chain(sorted_deps.iter().map(String::as_str)) {
        let fields = struct_fields(name, types)?;
        for field in fields {
            // Referenced structs must be defined, not just declared
            let base_type = get_base_type(&field.type_name);
            if types.get(base_type).is_some_and(|f| f.is_empty()) {
                return Err(Eip712Error::EmptyType(base_type.to_string()));
            }
        }
        result.push_str(&format_type_string(name, fields));
    }

    Ok(result)
}

/// Look up a struct's fields, rejecting undefined and empty structs
pub fn struct_fields<'a>(
    type_name: &str,
    types: &'a Types,
) -> Result<&'a [TypedDataField], Eip712Error> {
    match types.get(type_name) {
        None => Err(Eip712Error::UndefinedType(type_name.to_string())),
        Some(fields) if fields.is_empty() => Err(Eip712Error::EmptyType(type_name.to_string())),
        Some(fields) => Ok(fields),
    }
}

/// Format a single type string
fn format_type_string(type_name: &str, fields: &[TypedDataField]) -> String {
    let field_strs: Vec<String> = fields
        .iter()
        .map(|f| format!("{} {}", f.type_name, f.name))
        .collect();

    format!("{}({})", type_name, field_strs.join(","))
}

/// typeHash = keccak256(encodeType(typeOf(s)))
pub fn type_hash(type_name: &str, types: &Types) -> Result<[u8; 32], Eip712Error> {
    let encoded = encode_type(type_name, types)?;
    Ok(keccak256(encoded.as_bytes()))
}

#[cfg(test)]
mod resolver_tests {
    use super::*;

    fn schema(entries: &[(&str, &[(&str, &str)])]) -> Types {
        entries
            .iter()
            .map(|(name, fields)| {
                let fields = fields
                    .iter()
                    .map(|(n, t)| TypedDataField::new(*n, *t))
                    .collect();
                (name.to_string(), fields)
            })
            .collect()
    }

    fn mail_types() -> Types {
        schema(&[
            ("Mail", &[("from", "Person"), ("to", "Person"), ("contents", "string")]),
            ("Person", &[("name", "string"), ("wallet", "address")]),
        ])
    }

    #[test]
    fn test_encode_type_simple() {
        let types = mail_types();
        assert_eq!(
            encode_type("Person", &types).unwrap(),
            "Person(string name,address wallet)"
        );
    }

    #[test]
    fn test_encode_type_with_dependencies() {
        let types = mail_types();
        assert_eq!(
            encode_type("Mail", &types).unwrap(),
            "Mail(Person from,Person to,string contents)Person(string name,address wallet)"
        );
    }

    #[test]
    fn test_mail_type_hash() {
        let types = mail_types();
        assert_eq!(
            hex::encode(type_hash("Mail", &types).unwrap()),
            "a0cedeb2dc280ba39b857546d74f5549c3a1d7bdc2dd96bf881f76108e23dac2"
        );
    }

    #[test]
    fn test_dependencies_discovery_order() {
        let types = schema(&[
            ("Z", &[("c", "C"), ("a", "A")]),
            ("C", &[("b", "B")]),
            ("B", &[("v", "uint8")]),
            ("A", &[("v", "uint8")]),
        ]);

        assert_eq!(find_type_dependencies("Z", &types), vec!["Z", "C", "B", "A"]);
        // Primary first, the rest sorted regardless of discovery order
        assert_eq!(
            encode_type("Z", &types).unwrap(),
            "Z(C c,A a)A(uint8 v)B(uint8 v)C(B b)"
        );
    }

    #[test]
    fn test_primary_first_even_when_not_smallest() {
        let types = schema(&[
            ("Zebra", &[("a", "Apple")]),
            ("Apple", &[("v", "uint8")]),
        ]);
        assert!(encode_type("Zebra", &types).unwrap().starts_with("Zebra("));
    }

    #[test]
    fn test_dependencies_through_arrays() {
        let types = schema(&[
            ("Order", &[("items", "Item[]"), ("grid", "Cell[2][3]"), ("ids", "uint256[]")]),
            ("Item", &[("id", "uint256")]),
            ("Cell", &[("v", "bool")]),
        ]);

        assert_eq!(find_type_dependencies("Order", &types), vec!["Order", "Item", "Cell"]);
        assert_eq!(find_type_dependencies("Item[]", &types), vec!["Item"]);
    }

    #[test]
    fn test_cyclic_schema_terminates() {
        let types = schema(&[
            ("A", &[("b", "B")]),
            ("B", &[("a", "A[]"), ("x", "uint8")]),
        ]);

        assert_eq!(find_type_dependencies("A", &types), vec!["A", "B"]);
        assert_eq!(encode_type("A", &types).unwrap(), "A(B b)B(A[] a,uint8 x)");
        assert_eq!(encode_type("B", &types).unwrap(), "B(A[] a,uint8 x)A(B b)");
    }

    #[test]
    fn test_self_reference() {
        let types = schema(&[("Node", &[("value", "uint256"), ("children", "Node[]")])]);
        assert_eq!(find_type_dependencies("Node", &types), vec!["Node"]);
        assert_eq!(
            encode_type("Node", &types).unwrap(),
            "Node(uint256 value,Node[] children)"
        );
    }

    #[test]
    fn test_lexicographic_is_code_point_order() {
        let types = schema(&[
            ("Root", &[("a", "b"), ("b", "B"), ("c", "a")]),
            ("b", &[("v", "uint8")]),
            ("B", &[("v", "uint8")]),
            ("a", &[("v", "uint8")]),
        ]);
        // Uppercase sorts before lowercase
        assert_eq!(
            encode_type("Root", &types).unwrap(),
            "Root(b a,B b,a c)B(uint8 v)a(uint8 v)b(uint8 v)"
        );
    }

    #[test]
    fn test_undefined_and_empty_types() {
        let types = schema(&[("Mail", &[("from", "Person")]), ("Person", &[])]);

        assert_eq!(
            encode_type("Missing", &types),
            Err(Eip712Error::UndefinedType("Missing".to_string()))
        );
        assert_eq!(
            encode_type("Person", &types),
            Err(Eip712Error::EmptyType("Person".to_string()))
        );
        assert_eq!(
            encode_type("Mail", &types),
            Err(Eip712Error::EmptyType("Person".to_string()))
        );
    }

    #[test]
    fn test_get_base_type() {
        assert_eq!(get_base_type("Person[]"), "Person");
        assert_eq!(get_base_type("uint256[10]"), "uint256");
        assert_eq!(get_base_type("address"), "address");
        assert_eq!(get_base_type("My_Type[2][]"), "My_Type");
    }

    #[test]
    fn test_long_reference_chain() {
        const LEN: usize = 100_000;
        let mut types = Types::new();
        for i in 0..LEN - 1 {
            types.insert(format!("T{}", i), vec![TypedDataField::new("next", format!("T{}", i + 1))]);
        }
        types.insert(format!("T{}", LEN - 1), vec![TypedDataField::new("v", "uint8")]);

        let deps = find_type_dependencies("T0", &types);
        assert_eq!(deps.len(), LEN);
        assert_eq!(deps[..3], ["T0", "T1", "T2"]);

        let encoded = encode_type("T0", &types).unwrap();
        assert!(encoded.starts_with("T0(T1 next)T1(T2 next)T10(T11 next)"));
    }
}
