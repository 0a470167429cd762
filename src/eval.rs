// ABOUTME: Tree-walking evaluator: statement and expression semantics over the AST

use crate::ast::{
    BinaryOp, Channel, Expr, LogicalOp, MatchCase, MemberProperty, Module, Param, Stmt, UnaryOp,
    VarDeclarator,
};
use crate::env::Environment;
use crate::error::{catalog, ControlFlow, EvalOutcome, EvalResult, UmbraError};
use crate::location::Location;
use crate::types::{type_check, TypeTag};
use crate::value::{enum_signature, EnumMemberValue, EnumType, FunctionValue, HashKey, Value};
use std::collections::HashMap;
use std::rc::Rc;

fn rt<T>(code: &'static str, template: &str, args: &[&str], location: Option<Location>) -> EvalResult<T> {
    Err(EvalOutcome::Error(UmbraError::runtime(
        code, template, args, location,
    )))
}

fn ty<T>(code: &'static str, template: &str, args: &[&str], location: Option<Location>) -> EvalResult<T> {
    Err(EvalOutcome::Error(UmbraError::ty(code, template, args, location)))
}

/// Extracts the source location carried by an expression node, where the AST
/// records one. `Grouping` defers to its inner expression; literals and the
/// container/closure-literal expressions carry no location of their own.
fn expr_location(expr: &Expr) -> Option<Location> {
    match expr {
        Expr::Variable { location, .. }
        | Expr::Unary { location, .. }
        | Expr::Binary { location, .. }
        | Expr::Is { location, .. }
        | Expr::TypeConversion { location, .. }
        | Expr::Assign { location, .. }
        | Expr::Call { location, .. }
        | Expr::Member { location, .. }
        | Expr::NamespaceMember { location, .. } => Some(*location),
        Expr::Grouping(inner) => expr_location(inner),
        Expr::Literal { .. }
        | Expr::Logical { .. }
        | Expr::Array { .. }
        | Expr::Hashmap { .. }
        | Expr::Function { .. } => None,
    }
}

/// Evaluates every top-level declaration against `env` in order.
pub fn eval_module(module: &Module, env: &Rc<Environment>) -> EvalResult<()> {
    for decl in &module.declarations {
        eval_stmt(decl, env)?;
    }
    Ok(())
}

pub fn eval_stmt(stmt: &Stmt, env: &Rc<Environment>) -> EvalResult<()> {
    match stmt {
        Stmt::Block(stmts) => {
            let child = Environment::with_parent(env.clone());
            for s in stmts {
                eval_stmt(s, &child)?;
            }
            Ok(())
        }
        Stmt::Expression(expr) => {
            eval_expr(expr, env)?;
            Ok(())
        }
        Stmt::Var {
            declarator,
            initializer,
        } => eval_var_decl(declarator, initializer.as_ref(), env),
        Stmt::ArrayDestructuring { declarators, source } => {
            eval_array_destructuring(declarators, source, env)
        }
        Stmt::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let cond = eval_expr(condition, env)?;
            match cond {
                Value::Bool(true) => eval_stmt(then_branch, env),
                Value::Bool(false) => {
                    if let Some(e) = else_branch {
                        eval_stmt(e, env)
                    } else {
                        Ok(())
                    }
                }
                other => rt(
                    "RT041",
                    catalog::RT041_NON_BOOLEAN_CONDITION,
                    &[other.truthy_name()],
                    expr_location(condition),
                ),
            }
        }
        Stmt::ConditionalFor { condition, body } => eval_conditional_for(condition, body, env),
        Stmt::InitializedFor {
            init,
            stop,
            step,
            body,
        } => eval_initialized_for(init, stop, step.as_ref(), body, env),
        Stmt::Return { value, .. } => {
            let v = match value {
                Some(e) => eval_expr(e, env)?,
                None => Value::Null,
            };
            Err(EvalOutcome::Control(ControlFlow::Return(v)))
        }
        Stmt::Break(_) => Err(EvalOutcome::Control(ControlFlow::Break)),
        Stmt::Continue(_) => Err(EvalOutcome::Control(ControlFlow::Continue)),
        Stmt::Print { expr, channel } => {
            let v = eval_expr(expr, env)?;
            match channel {
                Channel::Stdout => print!("{}", v),
                Channel::Stderr => eprint!("{}", v),
            }
            Ok(())
        }
        Stmt::Public { names, .. } => {
            for name in names {
                env.make_public(name)?;
            }
            Ok(())
        }
        Stmt::Import { path, .. } => {
            let ns = crate::module_loader::load_module(path)?;
            let base = std::path::Path::new(path)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(path)
                .to_string();
            env.create_namespace(&base, ns)?;
            Ok(())
        }
        Stmt::Enum { name, members } => eval_enum_decl(name, members, env),
        Stmt::Match { scrutinee, cases } => eval_match(scrutinee, cases, env),
        Stmt::FunctionDecl { name, function } => {
            let fval = eval_expr(function, env)?;
            env.create(name, fval, TypeTag::Fun, false, false, false)?;
            Ok(())
        }
    }
}

fn eval_var_decl(
    declarator: &VarDeclarator,
    initializer: Option<&Expr>,
    env: &Rc<Environment>,
) -> EvalResult<()> {
    let init_loc = initializer.and_then(expr_location);
    let value = match initializer {
        Some(e) => eval_expr(e, env)?,
        None => zero_value_for(&declarator.declared_type, env, init_loc)?,
    };
    let resolved_tag = resolve_type_tag(&declarator.declared_type, env, init_loc)?;
    if !type_check(resolved_tag, value.type_tag(), declarator.nullable) {
        return ty(
            "TY001",
            catalog::TY001_DECLARED_TYPE_MISMATCH,
            &[value.truthy_name(), &resolved_tag.to_string()],
            init_loc,
        );
    }
    env.create(
        &declarator.name,
        value,
        resolved_tag,
        declarator.nullable,
        false,
        declarator.mutable,
    )?;
    Ok(())
}

fn eval_array_destructuring(
    declarators: &[VarDeclarator],
    source: &Expr,
    env: &Rc<Environment>,
) -> EvalResult<()> {
    let src_loc = expr_location(source);
    let src_val = eval_expr(source, env)?;
    let arr = match src_val {
        Value::Array(v) => v,
        other => {
            return rt(
                "RT035",
                catalog::RT035_DESTRUCTURE_NON_ARRAY,
                &[other.truthy_name()],
                src_loc,
            )
        }
    };
    for (i, decl) in declarators.iter().enumerate() {
        let v = match arr.get(i) {
            Some(v) => v.clone(),
            None => {
                return rt(
                    "RT004",
                    catalog::RT004_INDEX_OUT_OF_RANGE,
                    &[&i.to_string()],
                    src_loc,
                )
            }
        };
        let resolved_tag = resolve_type_tag(&decl.declared_type, env, src_loc)?;
        env.create(&decl.name, v, resolved_tag, decl.nullable, false, decl.mutable)?;
    }
    Ok(())
}

fn eval_conditional_for(
    condition: &Option<Expr>,
    body: &Stmt,
    env: &Rc<Environment>,
) -> EvalResult<()> {
    loop {
        let keep_going = match condition {
            Some(e) => match eval_expr(e, env)? {
                Value::Bool(b) => b,
                other => {
                    return rt(
                        "RT041",
                        catalog::RT041_NON_BOOLEAN_CONDITION,
                        &[other.truthy_name()],
                        expr_location(e),
                    )
                }
            },
            None => true,
        };
        if !keep_going {
            break;
        }
        match eval_stmt(body, env) {
            Ok(()) => {}
            Err(EvalOutcome::Control(ControlFlow::Break)) => break,
            Err(EvalOutcome::Control(ControlFlow::Continue)) => continue,
            Err(other) => return Err(other),
        }
    }
    Ok(())
}

fn eval_initialized_for(
    init: &Stmt,
    stop: &Expr,
    step: Option<&Expr>,
    body: &Stmt,
    env: &Rc<Environment>,
) -> EvalResult<()> {
    let loop_env = Environment::with_parent(env.clone());
    let stop_loc = expr_location(stop);
    // The loop mechanics mutate the induction variable every iteration
    // regardless of whether the source wrote `for const` or `for mut`; the
    // keyword only governs reassignment from inside the loop body.
    let (var_name, declared_type, nullable, initializer) = match init {
        Stmt::Var { declarator, initializer } => (
            declarator.name.clone(),
            declarator.declared_type.clone(),
            declarator.nullable,
            initializer.clone(),
        ),
        _ => {
            return rt(
                "RT036",
                catalog::RT036_LOOP_VARIABLE_NOT_NUMERIC,
                &["<non-var init>"],
                stop_loc,
            )
        }
    };
    let init_loc = initializer.as_ref().and_then(expr_location);
    let start_value = match &initializer {
        Some(e) => eval_expr(e, &loop_env)?,
        None => zero_value_for(&declared_type, &loop_env, init_loc)?,
    };
    let resolved_tag = resolve_type_tag(&declared_type, &loop_env, init_loc)?;
    loop_env.create(&var_name, start_value, resolved_tag, nullable, false, true)?;
    let stop_val = as_number(eval_expr(stop, &loop_env)?, "RT036", stop_loc)?;
    let step_loc = step.and_then(expr_location);
    let step_val = match step {
        Some(e) => as_number(eval_expr(e, &loop_env)?, "RT036", step_loc)?,
        None => 1.0,
    };
    loop {
        let current = as_number(
            loop_env.get(&var_name, true).unwrap().get_value(),
            "RT036",
            stop_loc,
        )?;
        let keep_going = if step_val >= 0.0 {
            current <= stop_val
        } else {
            current >= stop_val
        };
        if !keep_going {
            break;
        }
        let iter_env = Environment::with_parent(loop_env.clone());
        match eval_stmt(body, &iter_env) {
            Ok(()) => {}
            Err(EvalOutcome::Control(ControlFlow::Break)) => break,
            Err(EvalOutcome::Control(ControlFlow::Continue)) => {}
            Err(other) => return Err(other),
        }
        loop_env.assign(&var_name, Value::Number(current + step_val))?;
    }
    Ok(())
}

fn eval_enum_decl(
    name: &str,
    members: &[(String, Vec<crate::ast::TypeAnnotation>)],
    env: &Rc<Environment>,
) -> EvalResult<()> {
    let member_names: Vec<&str> = members.iter().map(|(n, _)| n.as_str()).collect();
    let signature = enum_signature(name, &member_names);
    let mut map = HashMap::new();
    for (member_name, types) in members {
        let tags: Vec<TypeTag> = types.iter().map(|t| t.tag).collect();
        map.insert(member_name.clone(), tags);
    }
    let enum_ty = Rc::new(EnumType {
        name: name.to_string(),
        members: map,
        signature,
    });
    env.create(name, Value::EnumType(enum_ty), TypeTag::Enum, false, false, false)?;
    Ok(())
}

fn eval_match(scrutinee: &Expr, cases: &[MatchCase], env: &Rc<Environment>) -> EvalResult<()> {
    let scrutinee_val = eval_expr(scrutinee, env)?;
    let scrutinee_member = match &scrutinee_val {
        Value::EnumMember(m) => m.clone(),
        _ => return Ok(()),
    };
    for case in cases {
        let pattern_val = eval_expr(&case.pattern, env)?;
        if let Value::EnumMember(pattern_member) = pattern_val {
            if pattern_member.signature == scrutinee_member.signature
                && pattern_member.member_name == scrutinee_member.member_name
            {
                if let Value::Function(func) = eval_expr(&case.handler, env)? {
                    call_function(&func, scrutinee_member.args.clone(), expr_location(&case.pattern))?;
                }
                return Ok(());
            }
        }
    }
    Ok(())
}

pub fn eval_expr(expr: &Expr, env: &Rc<Environment>) -> EvalResult<Value> {
    match expr {
        Expr::Literal { value, .. } => Ok(value.clone()),
        Expr::Variable { name, location } => match env.get(name, true) {
            Some(b) => Ok(b.get_value()),
            None => rt("RT002", catalog::RT002_UNDEFINED_VARIABLE, &[name], Some(*location)),
        },
        Expr::Grouping(inner) => eval_expr(inner, env),
        Expr::Unary { op, operand, location } => eval_unary(*op, operand, env, *location),
        Expr::Binary {
            left, op, right, location,
        } => eval_binary(*op, left, right, env, *location),
        Expr::Logical { left, op, right } => eval_logical(*op, left, right, env),
        Expr::Is {
            operand, type_ann, location,
        } => {
            let val = eval_expr(operand, env)?;
            let resolved = resolve_type_tag(type_ann, env, Some(*location))?;
            let matches = match &val {
                Value::EnumMember(m) => type_ann
                    .name
                    .as_deref()
                    .map(|n| n == m.enum_name)
                    .unwrap_or(false),
                other => other.type_tag() == resolved,
            };
            Ok(Value::Bool(matches))
        }
        Expr::TypeConversion {
            target, operand, location,
        } => eval_type_conversion(target, operand, env, *location),
        Expr::Assign { target, value, location } => eval_assign(target, value, env, *location),
        Expr::Call { callee, args, location } => eval_call(callee, args, env, *location),
        Expr::Member {
            object, property, location,
        } => eval_member_read(object, property, env, *location),
        Expr::NamespaceMember {
            namespace, property, location,
        } => eval_namespace_member(namespace, property, env, *location),
        Expr::Array { elements } => {
            let mut values = Vec::with_capacity(elements.len());
            for e in elements {
                values.push(eval_expr(e, env)?);
            }
            Ok(Value::Array(values))
        }
        Expr::Hashmap { pairs } => {
            let mut map = HashMap::new();
            for (k, v) in pairs {
                let key_val = eval_expr(k, env)?;
                let key = HashKey::from_value(&key_val).ok_or_else(|| {
                    EvalOutcome::Error(UmbraError::runtime(
                        "RT016",
                        catalog::RT016_INVALID_MEMBER_ACCESS,
                        &["key", key_val.truthy_name()],
                        expr_location(k),
                    ))
                })?;
                map.insert(key, eval_expr(v, env)?);
            }
            Ok(Value::Hashmap(map))
        }
        Expr::Function {
            name,
            params,
            return_type,
            nullable_return,
            body,
        } => Ok(Value::Function(Rc::new(FunctionValue {
            name: name.clone(),
            params: params.clone(),
            return_type: return_type.clone(),
            nullable_return: *nullable_return,
            body: Rc::new(body.clone()),
            closure: env.clone(),
        }))),
    }
}

fn char_code_shift(c: char, delta: f64) -> char {
    let code = c as i64 + delta.round() as i64;
    let clamped = code.clamp(0, 0x10FFFF);
    char::from_u32(clamped as u32).unwrap_or(char::REPLACEMENT_CHARACTER)
}

fn eval_unary(op: UnaryOp, operand: &Expr, env: &Rc<Environment>, location: Location) -> EvalResult<Value> {
    let val = eval_expr(operand, env)?;
    let loc = Some(location);
    match op {
        UnaryOp::Neg => match val {
            Value::Number(n) => Ok(Value::Number(-n)),
            other => rt(
                "RT042",
                catalog::RT042_BAD_UNARY_OPERAND,
                &["-", other.truthy_name()],
                loc,
            ),
        },
        UnaryOp::Not => match val {
            Value::Bool(b) => Ok(Value::Bool(!b)),
            other => rt(
                "RT042",
                catalog::RT042_BAD_UNARY_OPERAND,
                &["not", other.truthy_name()],
                loc,
            ),
        },
        UnaryOp::Typeof => Ok(Value::Str(val.type_tag().to_string())),
        UnaryOp::Length => match &val {
            Value::Array(a) => Ok(Value::Number(a.len() as f64)),
            Value::Str(s) => Ok(Value::Number(s.chars().count() as f64)),
            Value::Hashmap(h) => Ok(Value::Number(h.len() as f64)),
            other => rt(
                "RT042",
                catalog::RT042_BAD_UNARY_OPERAND,
                &["~", other.truthy_name()],
                loc,
            ),
        },
        UnaryOp::Range => match &val {
            Value::Number(n) => {
                if *n < 0.0 {
                    Ok(Value::Array(vec![]))
                } else {
                    Ok(Value::Array(
                        (0..(*n as i64)).map(|i| Value::Number(i as f64)).collect(),
                    ))
                }
            }
            Value::Str(s) => Ok(Value::Array(s.chars().map(Value::Char).collect())),
            Value::Hashmap(h) => Ok(Value::Array(
                h.iter()
                    .map(|(k, v)| Value::Array(vec![k.to_value(), v.clone()]))
                    .collect(),
            )),
            other => rt(
                "RT012",
                catalog::RT012_BAD_RANGE_OPERAND,
                &[other.truthy_name()],
                loc,
            ),
        },
    }
}

fn eval_binary(
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    env: &Rc<Environment>,
    location: Location,
) -> EvalResult<Value> {
    let l = eval_expr(left, env)?;
    let r = eval_expr(right, env)?;
    let loc = Some(location);
    match op {
        BinaryOp::Add => match (&l, &r) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{}{}", a, b))),
            (Value::Str(a), other) => Ok(Value::Str(format!("{}{}", a, other))),
            (other, Value::Str(b)) => Ok(Value::Str(format!("{}{}", other, b))),
            (Value::Char(a), Value::Char(b)) => {
                Ok(Value::Char(char_code_shift(*a, *b as u32 as f64)))
            }
            (Value::Char(a), Value::Number(n)) => Ok(Value::Char(char_code_shift(*a, *n))),
            (Value::Number(n), Value::Char(a)) => Ok(Value::Char(char_code_shift(*a, *n))),
            _ => rt(
                "RT007",
                catalog::RT007_BAD_ADD_OPERAND,
                &[l.truthy_name(), r.truthy_name()],
                loc,
            ),
        },
        BinaryOp::Sub => match (&l, &r) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
            (Value::Char(a), Value::Number(n)) => Ok(Value::Char(char_code_shift(*a, -*n))),
            (Value::Char(a), Value::Char(b)) => Ok(Value::Number((*a as i64 - *b as i64) as f64)),
            _ => rt(
                "RT027",
                catalog::RT027_BAD_SUB_OPERAND,
                &[l.truthy_name(), r.truthy_name()],
                loc,
            ),
        },
        BinaryOp::Mul => match (&l, &r) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
            _ => rt(
                "RT027",
                catalog::RT027_BAD_SUB_OPERAND,
                &[l.truthy_name(), r.truthy_name()],
                loc,
            ),
        },
        BinaryOp::Div => match (&l, &r) {
            (Value::Number(_), Value::Number(b)) if *b == 0.0 => {
                rt("RT008", catalog::RT008_DIVISION_BY_ZERO, &[], loc)
            }
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),
            _ => rt(
                "RT027",
                catalog::RT027_BAD_SUB_OPERAND,
                &[l.truthy_name(), r.truthy_name()],
                loc,
            ),
        },
        BinaryOp::Mod => match (&l, &r) {
            (Value::Number(_), Value::Number(b)) if *b == 0.0 => {
                rt("RT008", catalog::RT008_DIVISION_BY_ZERO, &[], loc)
            }
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a % b)),
            _ => rt("RT009", catalog::RT009_BAD_MOD_OPERAND, &[l.truthy_name()], loc),
        },
        BinaryOp::Less | BinaryOp::LessEq | BinaryOp::Greater | BinaryOp::GreaterEq => {
            let a = as_number(l.clone(), "RT026", loc)?;
            let b = as_number(r.clone(), "RT026", loc)?;
            let result = match op {
                BinaryOp::Less => a < b,
                BinaryOp::LessEq => a <= b,
                BinaryOp::Greater => a > b,
                BinaryOp::GreaterEq => a >= b,
                _ => unreachable!(),
            };
            Ok(Value::Bool(result))
        }
        BinaryOp::Eq | BinaryOp::NotEq => {
            let is_enum_l = matches!(l, Value::EnumMember(_));
            let is_enum_r = matches!(r, Value::EnumMember(_));
            if is_enum_l != is_enum_r {
                return rt(
                    "RT026",
                    catalog::RT026_BAD_COMPARISON_OPERAND,
                    &["==", l.truthy_name(), r.truthy_name()],
                    loc,
                );
            }
            let eq = l.structural_eq(&r);
            Ok(Value::Bool(if op == BinaryOp::Eq { eq } else { !eq }))
        }
        BinaryOp::EnumOf => match (&l, &r) {
            (Value::EnumMember(a), Value::EnumMember(b)) => Ok(Value::Bool(
                a.signature == b.signature && a.member_name == b.member_name,
            )),
            _ => rt(
                "RT026",
                catalog::RT026_BAD_COMPARISON_OPERAND,
                &["enumof", l.truthy_name(), r.truthy_name()],
                loc,
            ),
        },
    }
}

fn as_number(v: Value, code: &'static str, location: Option<Location>) -> EvalResult<f64> {
    match v {
        Value::Number(n) => Ok(n),
        Value::Char(c) => Ok(c as u32 as f64),
        other => {
            if code == "RT036" {
                rt(
                    code,
                    catalog::RT036_LOOP_VARIABLE_NOT_NUMERIC,
                    &[other.truthy_name()],
                    location,
                )
            } else {
                rt(
                    code,
                    catalog::RT026_BAD_COMPARISON_OPERAND,
                    &["compare", other.truthy_name()],
                    location,
                )
            }
        }
    }
}

fn eval_logical(op: LogicalOp, left: &Expr, right: &Expr, env: &Rc<Environment>) -> EvalResult<Value> {
    let l = eval_expr(left, env)?;
    if let Value::Bool(b) = l {
        match (op, b) {
            (LogicalOp::And, false) => return Ok(Value::Bool(false)),
            (LogicalOp::Or, true) => return Ok(Value::Bool(true)),
            _ => {}
        }
    }
    eval_expr(right, env)
}

fn resolve_type_tag(
    ann: &crate::ast::TypeAnnotation,
    env: &Rc<Environment>,
    location: Option<Location>,
) -> EvalResult<TypeTag> {
    if ann.tag != TypeTag::Unknown {
        return Ok(ann.tag);
    }
    let name = ann.name.as_deref().unwrap_or("");
    match env.get(name, true).map(|b| b.get_value()) {
        Some(Value::EnumType(_)) => Ok(TypeTag::Enum),
        _ => ty("TY004", catalog::TY004_UNRESOLVED_ENUM_TYPE, &[name], location),
    }
}

fn zero_value_for(
    ann: &crate::ast::TypeAnnotation,
    env: &Rc<Environment>,
    location: Option<Location>,
) -> EvalResult<Value> {
    let tag = resolve_type_tag(ann, env, location).unwrap_or(TypeTag::Any);
    Ok(match tag {
        TypeTag::Str => Value::Str(String::new()),
        TypeTag::Num => Value::Number(0.0),
        TypeTag::Bool => Value::Bool(false),
        TypeTag::Char => Value::Char('\0'),
        TypeTag::Arr => Value::Array(vec![]),
        TypeTag::Hashmap => Value::Hashmap(HashMap::new()),
        _ => Value::Null,
    })
}

fn eval_type_conversion(
    target: &crate::ast::TypeAnnotation,
    operand: &Expr,
    env: &Rc<Environment>,
    location: Location,
) -> EvalResult<Value> {
    let val = eval_expr(operand, env)?;
    let loc = Some(location);
    match target.tag {
        TypeTag::Str => Ok(Value::Str(format!("{}", val))),
        TypeTag::Char => match val {
            Value::Number(n) => Ok(Value::Char(
                char::from_u32(n as u32).unwrap_or(char::REPLACEMENT_CHARACTER),
            )),
            Value::Str(ref s) if s.chars().count() == 1 => Ok(Value::Char(s.chars().next().unwrap())),
            other => rt(
                "RT028",
                catalog::RT028_BAD_TYPE_CONVERSION,
                &[other.truthy_name(), "char"],
                loc,
            ),
        },
        TypeTag::Num => match &val {
            Value::Str(s) => Ok(Value::Number(s.trim().parse::<f64>().unwrap_or(f64::NAN))),
            Value::Char(c) => Ok(Value::Number(*c as u32 as f64)),
            Value::Bool(b) => Ok(Value::Number(if *b { 1.0 } else { 0.0 })),
            Value::Number(n) => Ok(Value::Number(*n)),
            other => rt(
                "RT028",
                catalog::RT028_BAD_TYPE_CONVERSION,
                &[other.truthy_name(), "num"],
                loc,
            ),
        },
        other_tag => rt(
            "RT028",
            catalog::RT028_BAD_TYPE_CONVERSION,
            &[val.truthy_name(), &other_tag.to_string()],
            loc,
        ),
    }
}

fn eval_assign(target: &Expr, value: &Expr, env: &Rc<Environment>, location: Location) -> EvalResult<Value> {
    let v = eval_expr(value, env)?;
    match target {
        Expr::Variable { name, .. } => {
            env.assign(name, v.clone())?;
            Ok(v)
        }
        Expr::Member { object, property, location: member_loc } => {
            eval_member_assign(object, property, v, env, *member_loc)
        }
        _ => rt(
            "RT016",
            catalog::RT016_INVALID_MEMBER_ACCESS,
            &["assign", "target"],
            Some(location),
        ),
    }
}

fn eval_member_assign(
    object: &Expr,
    property: &MemberProperty,
    new_value: Value,
    env: &Rc<Environment>,
    location: Location,
) -> EvalResult<Value> {
    let loc = Some(location);
    let current = eval_expr(object, env)?;
    match current {
        Value::Hashmap(mut map) => {
            let key_val = match property {
                MemberProperty::Name(n) => Value::Str(n.clone()),
                MemberProperty::Computed(e) => eval_expr(e, env)?,
            };
            let key = HashKey::from_value(&key_val).ok_or_else(|| {
                EvalOutcome::Error(UmbraError::runtime(
                    "RT016",
                    catalog::RT016_INVALID_MEMBER_ACCESS,
                    &["key", key_val.truthy_name()],
                    loc,
                ))
            })?;
            map.insert(key, new_value.clone());
            rebind_object(object, Value::Hashmap(map), env)?;
            Ok(new_value)
        }
        Value::Array(mut items) => {
            let idx_val = match property {
                MemberProperty::Computed(e) => eval_expr(e, env)?,
                MemberProperty::Name(_) => {
                    return rt(
                        "RT016",
                        catalog::RT016_INVALID_MEMBER_ACCESS,
                        &["array", "name"],
                        loc,
                    )
                }
            };
            let idx = as_number(idx_val, "RT026", loc)? as usize;
            if idx == items.len() {
                items.push(new_value.clone());
            } else if idx < items.len() {
                items[idx] = new_value.clone();
            } else {
                return rt("RT004", catalog::RT004_INDEX_OUT_OF_RANGE, &[&idx.to_string()], loc);
            }
            rebind_object(object, Value::Array(items), env)?;
            Ok(new_value)
        }
        other => rt(
            "RT016",
            catalog::RT016_INVALID_MEMBER_ACCESS,
            &["assign", other.truthy_name()],
            loc,
        ),
    }
}

fn rebind_object(object: &Expr, new_container: Value, env: &Rc<Environment>) -> EvalResult<()> {
    if let Expr::Variable { name, .. } = object {
        env.assign(name, new_container)?;
    }
    Ok(())
}

fn eval_call(callee: &Expr, args: &[Expr], env: &Rc<Environment>, location: Location) -> EvalResult<Value> {
    let loc = Some(location);
    if let Expr::NamespaceMember {
        namespace,
        property,
        ..
    } = callee
    {
        if let Some(Value::EnumType(enum_ty)) = env.get(namespace, true).map(|b| b.get_value()) {
            return eval_enum_constructor(&enum_ty, property, args, env, location);
        }
    }
    let callee_val = eval_expr(callee, env)?;
    let mut values = Vec::with_capacity(args.len());
    for a in args {
        values.push(eval_expr(a, env)?);
    }
    match callee_val {
        Value::Function(func) => call_function(&func, values, loc),
        Value::Native(native) => (native.func)(&values).map_err(EvalOutcome::Error),
        other => rt(
            "RT014",
            catalog::RT014_INVALID_CALL_TARGET,
            &[other.truthy_name()],
            loc,
        ),
    }
}

fn eval_enum_constructor(
    enum_ty: &Rc<EnumType>,
    member: &str,
    args: &[Expr],
    env: &Rc<Environment>,
    location: Location,
) -> EvalResult<Value> {
    let loc = Some(location);
    let arg_types = match enum_ty.members.get(member) {
        Some(t) => t,
        None => return rt("RT034", catalog::RT034_ENUM_MEMBER_NOT_FOUND, &[member], loc),
    };
    if arg_types.len() != args.len() {
        return ty(
            "TY002",
            catalog::TY002_ENUM_MEMBER_ARITY,
            &[member, &arg_types.len().to_string(), &args.len().to_string()],
            loc,
        );
    }
    let mut values = Vec::with_capacity(args.len());
    for (i, (expr, expected)) in args.iter().zip(arg_types).enumerate() {
        let v = eval_expr(expr, env)?;
        if !type_check(*expected, v.type_tag(), false) {
            return ty(
                "TY003",
                catalog::TY003_ENUM_MEMBER_TYPE,
                &[member, &i.to_string(), &expected.to_string(), v.truthy_name()],
                loc,
            );
        }
        values.push(v);
    }
    Ok(Value::EnumMember(Rc::new(EnumMemberValue {
        enum_name: enum_ty.name.clone(),
        signature: enum_ty.signature,
        member_name: member.to_string(),
        args: values,
    })))
}

pub fn call_function(
    func: &Rc<FunctionValue>,
    args: Vec<Value>,
    call_loc: Option<Location>,
) -> EvalResult<Value> {
    let call_env = Environment::with_parent(func.closure.clone());
    bind_params(&func.params, args, &call_env, call_loc)?;
    for stmt in func.body.iter() {
        match eval_stmt(stmt, &call_env) {
            Ok(()) => {}
            Err(EvalOutcome::Control(ControlFlow::Return(v))) => return Ok(v),
            Err(EvalOutcome::Control(ControlFlow::Break)) => {
                return rt("RT037", catalog::RT037_UNMATCHED_BREAK, &[], call_loc)
            }
            Err(EvalOutcome::Control(ControlFlow::Continue)) => {
                return rt("RT038", catalog::RT038_UNMATCHED_CONTINUE, &[], call_loc)
            }
            Err(other) => return Err(other),
        }
    }
    Ok(Value::Null)
}

fn bind_params(
    params: &[Param],
    args: Vec<Value>,
    call_env: &Rc<Environment>,
    location: Option<Location>,
) -> EvalResult<()> {
    let fixed_count = params.iter().filter(|p| !p.variadic).count();
    let has_variadic = params.iter().any(|p| p.variadic);
    if !has_variadic && args.len() != params.len() {
        return rt(
            "RT039",
            catalog::RT039_ARITY_MISMATCH,
            &[&params.len().to_string(), &args.len().to_string()],
            location,
        );
    }
    if has_variadic && args.len() < fixed_count {
        return rt(
            "RT039",
            catalog::RT039_ARITY_MISMATCH,
            &[&fixed_count.to_string(), &args.len().to_string()],
            location,
        );
    }
    let mut iter = args.into_iter();
    for param in params {
        if param.variadic {
            let rest: Vec<Value> = iter.by_ref().collect();
            call_env.create(&param.name, Value::Array(rest), TypeTag::Arr, false, false, false)?;
            break;
        }
        let v = iter.next().unwrap_or(Value::Null);
        let tag = if param.type_ann.tag != TypeTag::Unknown {
            param.type_ann.tag
        } else {
            TypeTag::Any
        };
        if !type_check(tag, v.type_tag(), param.nullable) {
            return ty(
                "TY001",
                catalog::TY001_DECLARED_TYPE_MISMATCH,
                &[v.truthy_name(), &tag.to_string()],
                location,
            );
        }
        call_env.create(&param.name, v, tag, param.nullable, false, false)?;
    }
    Ok(())
}

fn eval_member_read(
    object: &Expr,
    property: &MemberProperty,
    env: &Rc<Environment>,
    location: Location,
) -> EvalResult<Value> {
    let loc = Some(location);
    let obj_val = eval_expr(object, env)?;
    match (&obj_val, property) {
        (Value::Hashmap(map), MemberProperty::Name(name)) => Ok(map
            .get(&HashKey::Str(name.clone()))
            .cloned()
            .unwrap_or(Value::Null)),
        (Value::Hashmap(map), MemberProperty::Computed(e)) => {
            let key_val = eval_expr(e, env)?;
            let key = HashKey::from_value(&key_val).ok_or_else(|| {
                EvalOutcome::Error(UmbraError::runtime(
                    "RT016",
                    catalog::RT016_INVALID_MEMBER_ACCESS,
                    &["key", key_val.truthy_name()],
                    loc,
                ))
            })?;
            Ok(map.get(&key).cloned().unwrap_or(Value::Null))
        }
        (Value::Array(items), MemberProperty::Computed(e)) => {
            let idx = as_number(eval_expr(e, env)?, "RT026", loc)? as i64;
            if idx < 0 || idx as usize >= items.len() {
                return rt("RT004", catalog::RT004_INDEX_OUT_OF_RANGE, &[&idx.to_string()], loc);
            }
            Ok(items[idx as usize].clone())
        }
        (Value::Str(s), MemberProperty::Computed(e)) => {
            let idx = as_number(eval_expr(e, env)?, "RT026", loc)? as i64;
            let chars: Vec<char> = s.chars().collect();
            if idx < 0 || idx as usize >= chars.len() {
                return rt("RT004", catalog::RT004_INDEX_OUT_OF_RANGE, &[&idx.to_string()], loc);
            }
            Ok(Value::Char(chars[idx as usize]))
        }
        (Value::EnumType(enum_ty), MemberProperty::Name(name)) => {
            if enum_ty.members.contains_key(name) {
                Ok(Value::EnumMember(Rc::new(EnumMemberValue {
                    enum_name: enum_ty.name.clone(),
                    signature: enum_ty.signature,
                    member_name: name.clone(),
                    args: vec![],
                })))
            } else {
                rt("RT034", catalog::RT034_ENUM_MEMBER_NOT_FOUND, &[name], loc)
            }
        }
        (other, MemberProperty::Name(name)) => rt(
            "RT016",
            catalog::RT016_INVALID_MEMBER_ACCESS,
            &[name, other.truthy_name()],
            loc,
        ),
        (other, MemberProperty::Computed(_)) => rt(
            "RT016",
            catalog::RT016_INVALID_MEMBER_ACCESS,
            &["[]", other.truthy_name()],
            loc,
        ),
    }
}

fn eval_namespace_member(
    namespace: &str,
    property: &str,
    env: &Rc<Environment>,
    location: Location,
) -> EvalResult<Value> {
    let loc = Some(location);
    if let Some(Value::EnumType(enum_ty)) = env.get(namespace, true).map(|b| b.get_value()) {
        if !enum_ty.members.contains_key(property) {
            return rt("RT034", catalog::RT034_ENUM_MEMBER_NOT_FOUND, &[property], loc);
        }
        return Ok(Value::EnumMember(Rc::new(EnumMemberValue {
            enum_name: enum_ty.name.clone(),
            signature: enum_ty.signature,
            member_name: property.to_string(),
            args: vec![],
        })));
    }
    let ns = env.get_namespace(namespace).ok_or_else(|| {
        EvalOutcome::Error(UmbraError::runtime(
            "RT029",
            catalog::RT029_NAMESPACE_NOT_FOUND,
            &[namespace],
            loc,
        ))
    })?;
    match ns.get(property, false) {
        Some(b) => Ok(b.get_value()),
        None => rt(
            "RT030",
            catalog::RT030_NAMESPACE_MEMBER_NOT_FOUND,
            &[namespace, property],
            loc,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;

    fn run(src: &str) -> Rc<Environment> {
        let module = parse_source(src).unwrap();
        let env = Environment::new();
        eval_module(&module, &env).unwrap();
        env
    }

    #[test]
    fn test_arithmetic() {
        let env = run("const x num = 3 + 4");
        assert!(matches!(env.get("x", true).unwrap().get_value(), Value::Number(n) if n == 7.0));
    }

    #[test]
    fn test_array_index_assign_and_length() {
        let env = run(
            r#"
            mut arr arr = [1, 2, 3]
            arr[1] = 9
            const len num = ~arr
            "#,
        );
        let arr = env.get("arr", true).unwrap().get_value();
        assert!(matches!(arr, Value::Array(ref v) if matches!(v[1], Value::Number(n) if n == 9.0)));
        assert!(matches!(env.get("len", true).unwrap().get_value(), Value::Number(n) if n == 3.0));
    }

    #[test]
    fn test_enum_match() {
        let env = run(
            r#"
            enum Maybe { Some(num) None }
            mut result num = 0
            def apply(m any) num {
                match m {
                    Maybe::Some |n num| { return n }
                    Maybe::None || { return 0 }
                }
                return -1
            }
            result = apply(Maybe::Some(42))
            "#,
        );
        assert!(matches!(env.get("result", true).unwrap().get_value(), Value::Number(n) if n == 42.0));
    }

    #[test]
    fn test_for_loop_prints() {
        run("for const i num = 0, 3 { stdout i }");
    }

    #[test]
    fn test_recursive_factorial() {
        let env = run(
            r#"
            def fact(n num) num {
                if n <= 1 { return 1 }
                return n * fact(n - 1)
            }
            const result num = fact(5)
            "#,
        );
        assert!(matches!(env.get("result", true).unwrap().get_value(), Value::Number(n) if n == 120.0));
    }

    #[test]
    fn test_array_destructuring() {
        let env = run(
            r#"
            const pair arr = [40, 20]
            const [a, b] = pair
            const total num = a + b
            "#,
        );
        assert!(matches!(env.get("total", true).unwrap().get_value(), Value::Number(n) if n == 60.0));
    }

    #[test]
    fn test_logical_short_circuit() {
        let env = run("const a bool = false and true");
        assert!(matches!(env.get("a", true).unwrap().get_value(), Value::Bool(false)));
    }

    #[test]
    fn test_type_mismatch_assignment_fails() {
        let module = parse_source("mut x num = 1\nx = \"oops\"").unwrap();
        let env = Environment::new();
        let err = eval_module(&module, &env).unwrap_err();
        assert!(matches!(err, EvalOutcome::Error(UmbraError::Type { code: "TY001", .. })));
    }

    #[test]
    fn test_nan_never_equal() {
        let env = run("const x bool = NaN == NaN");
        assert!(matches!(env.get("x", true).unwrap().get_value(), Value::Bool(false)));
    }

    #[test]
    fn test_undefined_variable_error_carries_location() {
        let module = parse_source("stdout missing").unwrap();
        let env = Environment::new();
        let err = eval_module(&module, &env).unwrap_err();
        match err {
            EvalOutcome::Error(UmbraError::Runtime { code: "RT002", location, .. }) => {
                assert!(location.is_some());
            }
            other => panic!("expected RT002 with a location, got {:?}", other),
        }
    }
}
