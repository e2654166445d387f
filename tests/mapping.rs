#[cfg(test)]
mod tests {
    use jsonmap::derive::{Bind, Describe, Emit};
    use jsonmap::*;
    use rust_decimal::Decimal;

    #[derive(Bind, Clone, Debug, Default, Describe, Emit, PartialEq)]
    struct Address {
        id: i64,
        city: String,
        address_line: String,
    }

    #[derive(Bind, Clone, Debug, Default, Describe, Emit, PartialEq)]
    struct Person {
        id: i64,
        first_name: String,
        last_name: String,
        address_id: Option<i64>,
        address: Option<Address>,
    }

    fn ivan() -> Person {
        Person {
            id: 1,
            first_name: "Ivan".to_owned(),
            last_name: "Petrov".to_owned(),
            address_id: Some(2),
            address: Some(Address {
                id: 2,
                city: "Sofia".to_owned(),
                address_line: "1 Vitosha Blvd".to_owned(),
            }),
        }
    }

    #[test]
    fn person_round_trip() {
        let options = Options::default();
        let text = serialize(&ivan(), &options);

        assert_eq!(
            text,
            r#"{"address":{"addressLine":"1 Vitosha Blvd","city":"Sofia","id":2},"addressId":2,"firstName":"Ivan","id":1,"lastName":"Petrov"}"#
        );
        assert_eq!(deserialize::<Person>(&text, &options), Ok(ivan()));
        assert_eq!(
            deserialize::<Person>(&text, &options.clone().with_strict(true)),
            Ok(ivan())
        );
    }

    #[test]
    fn re_emit_is_stable() {
        let options = Options::default();
        let text = "{lastName: Petrov, ID: 3, address: {addressLine: x, CITY: y}}";
        let once = serialize(&deserialize::<Person>(text, &options).unwrap(), &options);
        let twice = serialize(&deserialize::<Person>(&once, &options).unwrap(), &options);

        assert_eq!(once, twice);
        assert_eq!(
            once,
            r#"{"address":{"addressLine":"x","city":"y"},"id":3,"lastName":"Petrov"}"#
        );
    }

    #[derive(Bind, Debug, Default, Describe, Emit, PartialEq)]
    struct Employee {
        person: Person,
        salary: Decimal,
    }

    #[derive(Bind, Debug, Describe, Emit, PartialEq)]
    enum Party {
        Person(Person),
        Employee(Employee),
    }

    #[test]
    fn polymorphic_round_trip() {
        let options = Options::default().with_type_info(true);
        let parties = vec![
            Party::Person(ivan()),
            Party::Employee(Employee {
                person: ivan(),
                salary: Decimal::new(123450, 2),
            }),
        ];
        let text = serialize(&parties, &options);

        assert!(text.starts_with(r#"[{"@type":"Person","address":"#));
        assert!(text.contains(r#"{"@type":"Employee","person":{"address":"#));
        assert!(text.ends_with(r#""salary":1234.50}]"#));
        assert_eq!(deserialize::<Vec<Party>>(&text, &options), Ok(parties));
    }

    #[test]
    fn person_lenient_input() {
        let options = Options::default();
        let cases = vec![
            (
                "{firstName: 'Ivan'}",
                Person {
                    first_name: "Ivan".to_owned(),
                    ..Person::default()
                },
            ),
            (
                "{ FIRSTNAME: Ivan , id: '5' }",
                Person {
                    id: 5,
                    first_name: "Ivan ".to_owned(),
                    ..Person::default()
                },
            ),
            (
                "{address: {City: Sofia}, addressId: 4, unknown: [1, 2]}",
                Person {
                    address_id: Some(4),
                    address: Some(Address {
                        city: "Sofia".to_owned(),
                        ..Address::default()
                    }),
                    ..Person::default()
                },
            ),
            (
                "{lastName: 'multi\n    line'}",
                Person {
                    last_name: "multiline".to_owned(),
                    ..Person::default()
                },
            ),
        ];

        for (input, want) in cases {
            assert_eq!(deserialize::<Person>(input, &options), Ok(want), "{input}");
        }
    }

    #[test]
    fn person_default_elided() {
        let options = Options::default();

        assert_eq!(serialize(&Person::default(), &options), "{}");
        assert_eq!(
            serialize(
                &Person {
                    address: Some(Address::default()),
                    ..Person::default()
                },
                &options
            ),
            r#"{"address":{}}"#
        );
    }

    #[test]
    fn person_list() {
        let options = Options::default().with_strict(true);
        let people = vec![ivan(), Person::default()];
        let text = serialize(&people, &options);

        assert_eq!(deserialize::<Vec<Person>>(&text, &options), Ok(people));
    }

    #[test]
    fn parse_errors_with_position() {
        let options = Options::default().with_line_info(true);
        let cases = vec![
            ("{firstName: 'Ivan'", "unterminated object", 1, 19),
            ("{\n  id: 1,\n  firstName: \"Ivan\\q\"\n}", "unknown escape sequence in string", 3, 21),
        ];

        for (input, message, line, column) in cases {
            match deserialize::<Person>(input, &options) {
                Err(Error::Parse(err)) => {
                    assert_eq!(
                        (err.message.as_str(), err.line, err.column),
                        (message, line, column),
                        "{input:?}"
                    );
                }
                other => panic!("{input:?}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn numeric_bucketing() {
        let cases = vec![
            ("12", Value::Int32(12)),
            ("-2147483648", Value::Int32(i32::MIN)),
            ("2147483648", Value::Int64(2147483648)),
            ("5.0", Value::Decimal(Decimal::new(50, 1))),
            ("1e30", Value::Double(1e30)),
        ];

        for (input, want) in cases {
            assert_eq!(parse(input, false), Ok(want), "{input}");
        }
    }

    #[test]
    fn descriptors_are_shared() {
        let a = Person::descriptor();
        let b = std::thread::spawn(|| Person::descriptor() as *const _ as usize)
            .join()
            .unwrap();

        assert_eq!(a as *const _ as usize, b);

        let names = a.members().iter().map(|m| m.name()).collect::<Vec<_>>();
        assert_eq!(
            names,
            vec!["address", "addressId", "firstName", "id", "lastName"]
        );
    }
}
